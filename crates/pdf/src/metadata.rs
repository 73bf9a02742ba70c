//! 导出文档的元信息标记

use chrono::Utc;
use lopdf::{Dictionary, Document, Object, StringFormat};

const PRODUCER: &str = concat!("veil-redact v", env!("CARGO_PKG_VERSION"));

fn literal(value: &str) -> Object {
    Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
}

/// 在 Info 字典中记录脱敏工具与时间，Info 不存在时新建
pub fn stamp_redaction_metadata(doc: &mut Document) {
    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => *id,
        _ => {
            let new_id = doc.add_object(Object::Dictionary(Dictionary::new()));
            doc.trailer.set("Info", Object::Reference(new_id));
            new_id
        }
    };

    // PDF 日期格式 D:YYYYMMDDHHmmSSZ
    let pdf_date = format!("D:{}Z", Utc::now().format("%Y%m%d%H%M%S"));

    match doc.get_object_mut(info_id) {
        Ok(Object::Dictionary(info)) => {
            info.set("Producer", literal(PRODUCER));
            info.set("ModDate", literal(&pdf_date));
            info.set("RedactedBy", literal(PRODUCER));
            info.set("RedactedAt", literal(&pdf_date));
            log::info!(
                "[Metadata] 已设置脱敏元信息: Producer={}, ModDate={}",
                PRODUCER,
                pdf_date
            );
        }
        _ => log::warn!("[Metadata] Info 引用 {:?} 不是字典，跳过", info_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_info_dictionary() {
        let mut doc = Document::with_version("1.7");
        stamp_redaction_metadata(&mut doc);

        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"Producer").unwrap().as_str().unwrap(), PRODUCER.as_bytes());
        let at = info.get(b"RedactedAt").unwrap().as_str().unwrap();
        assert!(at.starts_with(b"D:"));
    }
}
