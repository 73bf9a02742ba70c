//! 页面边界框

use lopdf::{Document, Object, ObjectId};
use veil_core::{PageSize, Rotation};

/// Parent 链的最大深度，防止循环引用
const MAX_INHERIT_DEPTH: usize = 32;

/// 页面可见区域（PDF 点），左下角可能不在原点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PageBox {
    pub const LETTER: PageBox = PageBox {
        llx: 0.0,
        lly: 0.0,
        urx: 612.0,
        ury: 792.0,
    };

    pub fn size(&self) -> PageSize {
        PageSize::new(self.urx - self.llx, self.ury - self.lly)
    }
}

/// 从数组对象中提取边界框坐标，坐标顺序不规范时自动纠正
fn extract_box_values(arr: &[Object]) -> Option<PageBox> {
    let values: Vec<f64> = arr
        .iter()
        .filter_map(|o| match o {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        })
        .collect();
    if values.len() != 4 {
        return None;
    }
    let b = PageBox {
        llx: values[0].min(values[2]),
        lly: values[1].min(values[3]),
        urx: values[0].max(values[2]),
        ury: values[1].max(values[3]),
    };
    (b.urx > b.llx && b.ury > b.lly).then_some(b)
}

fn box_entry(doc: &Document, id: ObjectId, key: &[u8]) -> Option<PageBox> {
    let dict = doc.get_dictionary(id).ok()?;
    let value = match dict.get(key).ok()? {
        Object::Reference(r) => doc.get_object(*r).ok()?,
        other => other,
    };
    match value {
        Object::Array(arr) => extract_box_values(arr),
        _ => None,
    }
}

fn parent_of(doc: &Document, id: ObjectId) -> Option<ObjectId> {
    doc.get_dictionary(id)
        .ok()
        .and_then(|d| d.get(b"Parent").ok())
        .and_then(|p| p.as_reference().ok())
}

/// 页面的有效边界框
///
/// 优先使用页面自身的 CropBox，其次 MediaBox，再沿 Parent 链继承
/// （CropBox 和 MediaBox 都可继承），都没有时使用 Letter 尺寸。
/// 返回的是未旋转的坐标，旋转见 [`page_rotation`]。
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    let mut current = Some(page_id);
    let mut depth = 0;

    while let Some(id) = current {
        if depth > MAX_INHERIT_DEPTH {
            break;
        }
        if let Some(b) = box_entry(doc, id, b"CropBox") {
            log::debug!("[MediaBox] 使用 CropBox: {:?}", b);
            return b;
        }
        if let Some(b) = box_entry(doc, id, b"MediaBox") {
            log::debug!("[MediaBox] 使用 MediaBox: {:?}", b);
            return b;
        }
        current = parent_of(doc, id);
        depth += 1;
    }

    log::warn!("[MediaBox] 页面 {:?} 缺少边界框，使用默认 Letter 尺寸", page_id);
    PageBox::LETTER
}

/// 页面的 `/Rotate`，可从任意一级父节点继承
///
/// 不是 90 的倍数的值按无旋转处理。
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> Rotation {
    let mut current = Some(page_id);
    let mut depth = 0;

    while let Some(id) = current {
        if depth > MAX_INHERIT_DEPTH {
            break;
        }
        let value = doc
            .get_dictionary(id)
            .ok()
            .and_then(|d| d.get(b"Rotate").ok())
            .and_then(|o| match o {
                Object::Reference(r) => doc.get_object(*r).ok(),
                other => Some(other),
            })
            .and_then(|o| match o {
                Object::Integer(i) => Some(*i),
                Object::Real(r) => Some(r.round() as i64),
                _ => None,
            });
        if let Some(degrees) = value {
            return match Rotation::from_degrees(degrees) {
                Some(rotation) => {
                    log::debug!("[MediaBox] 页面旋转角度: {} 度", rotation.degrees());
                    rotation
                }
                None => {
                    log::warn!("[MediaBox] 无效的旋转角度 {}，按 0 度处理", degrees);
                    Rotation::None
                }
            };
        }
        current = parent_of(doc, id);
        depth += 1;
    }
    Rotation::None
}

/// 页面几何：未旋转的尺寸加上显示旋转
pub fn page_geometry(doc: &Document, page_id: ObjectId) -> PageSize {
    page_box(doc, page_id)
        .size()
        .with_rotation(page_rotation(doc, page_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_crop_box_wins_over_media_box() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "CropBox" => vec![Object::Real(10.0), Object::Real(20.0), Object::Real(310.0), Object::Real(420.0)],
        });
        let b = page_box(&doc, page_id);
        assert_eq!(b, PageBox { llx: 10.0, lly: 20.0, urx: 310.0, ury: 420.0 });
        assert_eq!(b.size(), PageSize::new(300.0, 400.0));
    }

    #[test]
    fn test_missing_box_defaults_to_letter() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        assert_eq!(page_box(&doc, page_id), PageBox::LETTER);
    }

    #[test]
    fn test_rotation_is_inherited_and_normalized() {
        let mut doc = Document::with_version("1.7");
        let parent_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Rotate" => -90,
        });
        let inherits = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent_id,
        });
        let overrides = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent_id,
            "Rotate" => 90,
        });
        let odd = doc.add_object(dictionary! {
            "Type" => "Page",
            "Rotate" => 45,
        });

        assert_eq!(page_rotation(&doc, inherits), Rotation::Cw270);
        assert_eq!(page_rotation(&doc, overrides), Rotation::Cw90);
        assert_eq!(page_rotation(&doc, odd), Rotation::None);

        let geometry = page_geometry(&doc, overrides);
        assert_eq!(geometry.rotation, Rotation::Cw90);
        assert_eq!(geometry.displayed(), (792.0, 612.0));
    }

    #[test]
    fn test_degenerate_box_is_ignored() {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 0.into(), 792.into()],
        });
        assert_eq!(page_box(&doc, page_id), PageBox::LETTER);
    }
}
