mod cli;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use realgeopolitics_core::load_scenario;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let scenario_path = resolve_scenario_path()?;

    let file = File::open(&scenario_path).with_context(|| format!("シナリオファイルを開けません: {}", scenario_path.display()))?;
    let mut reader = BufReader::new(file);
    let mut json = String::new();
    reader.read_to_string(&mut json).with_context(|| format!("シナリオファイルの読み込みに失敗しました: {}", scenario_path.display()))?;

    let state = load_scenario(&json).with_context(|| format!("シナリオファイルの解析に失敗しました: {}", scenario_path.display()))?;

    cli::run(state)
}

fn resolve_scenario_path() -> Result<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(PathBuf::from(arg));
    }

    let cwd = std::env::current_dir().context("カレントディレクトリの取得に失敗しました")?;
    let candidates = [
        cwd.join("scenarios").join("default.json"),
        Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("scenarios").join("default.json"),
    ];

    for path in candidates {
        if path.exists() {
            return Ok(path);
        }
    }

    anyhow::bail!("シナリオファイルが見つかりません。パスを引数で指定するか scenarios/default.json を配置してください。")
}
