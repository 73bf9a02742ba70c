use std::fs::File;
use std::path::Path;

use anyhow::Context;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// 终端日志写到 stderr，stdout 留给命令输出；指定文件时同时写文件
pub fn init(level: LevelFilter, file: Option<&Path>) -> anyhow::Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
    }

    CombinedLogger::init(loggers).context("logger already initialized")?;
    Ok(())
}
