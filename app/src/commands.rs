use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context};
use veil_core::{Category, DetectionOutcome, Session};
use veil_pdf::LopdfExporter;
use veil_render::PdfProvider;

use crate::config::AppConfig;
use crate::gestures;

/// 组装会话；需要预览时尝试绑定 pdfium，失败则退回无渲染模式
pub fn build_session(config: &AppConfig, want_raster: bool) -> anyhow::Result<Session> {
    let provider = if want_raster || config.pdfium_library_path.is_some() {
        match veil_render::bind(config.pdfium_library_path.as_deref()) {
            Ok(rasterizer) => PdfProvider::with_rasterizer(rasterizer),
            Err(e) => {
                log::warn!("[Render] {}，预览将只包含覆盖层", e);
                PdfProvider::headless()
            }
        }
    } else {
        PdfProvider::headless()
    };

    let detector = veil_detect::build(&config.detector).context("failed to set up detector")?;
    let session = Session::new(
        config.session.clone(),
        Rc::new(provider),
        detector,
        Arc::new(LopdfExporter),
    )
    .context("invalid session configuration")?;
    session.subscribe(|event| log::debug!("[Event] {:?}", event));
    Ok(session)
}

async fn open(session: &Session, input: &Path) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let summary = session
        .load(input.to_string_lossy(), bytes)
        .await
        .with_context(|| format!("failed to open {}", input.display()))?;
    log::info!("[Open] {}: {} 页", summary.name, summary.page_count);
    Ok(())
}

async fn detect_into(session: &Session) -> anyhow::Result<()> {
    match session.detect().await? {
        DetectionOutcome::Applied(count) => log::info!("[Detect] {} 条建议", count),
        DetectionOutcome::Stale => log::warn!("[Detect] 结果已过期"),
        DetectionOutcome::Failed(e) => log::warn!("[Detect] {}，继续手动流程", e),
    }
    Ok(())
}

/// `detect`：输出建议列表
pub async fn detect(config: &AppConfig, input: &Path) -> anyhow::Result<()> {
    let session = build_session(config, false)?;
    open(&session, input).await?;
    detect_into(&session).await?;

    let entries = session.suggestion_entries();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// `init-config`：把当前生效的配置写到配置文件路径
pub fn init_config(config: &AppConfig, path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("[Config] 已写入 {}", path.display());
    println!("{}", path.display());
    Ok(())
}

pub struct RedactArgs {
    pub input: PathBuf,
    pub gestures: Option<PathBuf>,
    pub accept: Vec<String>,
    pub out_dir: Option<PathBuf>,
    pub preview: Option<PathBuf>,
    pub skip_detection: bool,
}

fn parse_categories(labels: &[String]) -> anyhow::Result<BTreeSet<&'static str>> {
    labels
        .iter()
        .map(|label| match Category::parse(label) {
            Some(category) => Ok(category.label()),
            None => bail!("unknown category: {}", label),
        })
        .collect()
}

/// `redact`：载入、检测、回放手势、接受指定类别的建议，然后导出
pub async fn redact(config: &AppConfig, args: RedactArgs) -> anyhow::Result<()> {
    let accepted = parse_categories(&args.accept)?;
    let session = build_session(config, args.preview.is_some())?;
    open(&session, &args.input).await?;

    if !args.skip_detection {
        detect_into(&session).await?;
    }

    if let Some(path) = &args.gestures {
        let recorded = gestures::load(path)?;
        let summary = gestures::replay(&session, &recorded)?;
        log::info!(
            "[Replay] 新增 {} 个区域，丢弃 {} 个手势",
            summary.committed,
            summary.discarded
        );
    }

    for entry in session.suggestion_entries() {
        if accepted.contains(entry.category.label()) {
            session.accept_suggestion(entry.id);
        }
    }

    let artifact = session.export().await.context("export failed")?;
    let out_dir = match args.out_dir {
        Some(dir) => dir,
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let output = out_dir.join(&artifact.file_name);
    std::fs::write(&output, &artifact.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("[Export] 已写入 {}", output.display());

    if let Some(dir) = &args.preview {
        write_previews(config, &session, dir).await?;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "output": output,
            "redactions": session.redaction_summaries(),
        }))?
    );
    Ok(())
}

/// 为每个有区域的页面输出一张合成了覆盖层的 PNG
async fn write_previews(config: &AppConfig, session: &Session, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    session.set_show_suggestions(false);
    session.zoom_to(config.preview_scale());

    let pages: BTreeSet<u32> = session.redactions().iter().map(|r| r.page).collect();
    for page in pages {
        session.go_to_page(page)?;
        let mut rendered = session.render_current().await?;
        veil_render::compose(&mut rendered.raster, &rendered.overlays);
        let path = dir.join(format!("page-{:03}.png", page));
        veil_render::save_png(&rendered.raster, &path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veil.json");

        let config = AppConfig {
            render_dpi: 96,
            ..AppConfig::default()
        };
        init_config(&config, &path, false).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);

        assert!(init_config(&AppConfig::default(), &path, false).is_err());
        assert_eq!(AppConfig::load(&path).unwrap().render_dpi, 96);

        init_config(&AppConfig::default(), &path, true).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_parse_categories() {
        let set = parse_categories(&["Email".to_string(), "ssn".to_string()]).unwrap();
        assert!(set.contains("email"));
        assert!(set.contains("ssn"));
        assert!(parse_categories(&["shoe-size".to_string()]).is_err());
    }
}
