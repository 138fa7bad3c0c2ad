use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow};
use realgeopolitics_core::{Commodity, SimulationState, advance};

pub fn run(mut state: SimulationState) -> Result<()> {
    print_intro(&state);
    let stdin = io::stdin();

    loop {
        print!("tick={}> ", state.tick);
        io::stdout().flush().context("プロンプトのフラッシュに失敗しました")?;

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line).context("入力の読み込みに失敗しました")?;
        if bytes == 0 {
            println!("入力が終了したためシミュレーションを終了します。");
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match dispatch_command(state, trimmed) {
            Ok(next) => state = next,
            Err((next, error)) => {
                println!("エラー: {error}");
                state = next;
            }
        }
    }
}

fn dispatch_command(state: SimulationState, input: &str) -> Result<SimulationState, (SimulationState, anyhow::Error)> {
    let mut parts = input.split_whitespace();
    let command = match parts.next() {
        Some(c) => c.to_ascii_lowercase(),
        None => return Ok(state),
    };

    match command.as_str() {
        "help" | "?" => {
            print_help();
            Ok(state)
        }
        "overview" | "ov" => {
            print_overview(&state);
            Ok(state)
        }
        "inspect" | "show" => {
            let token = parts.next();
            match resolve_country_index(&state, token) {
                Ok(idx) => {
                    print_country_details(&state, idx);
                    Ok(state)
                }
                Err(e) => Err((state, e)),
            }
        }
        "advance" | "tick" => {
            let n = match parts.next().unwrap_or("1").parse::<u64>() {
                Ok(n) => n,
                Err(_) => return Err((state, anyhow!("進めるティック数は正の整数で指定してください。"))),
            };
            match advance(state, n) {
                Ok(next) => {
                    print_reports(n, &next);
                    Ok(next)
                }
                Err(e) => {
                    println!("致命的エラーによりシミュレーションを停止します: {e}");
                    std::process::exit(1);
                }
            }
        }
        "report" => {
            print_report(&state);
            Ok(state)
        }
        "quit" | "exit" => {
            println!("シミュレーションを終了します。");
            std::process::exit(0);
        }
        other => Err((state, anyhow!("未知のコマンドです: {other}. help で一覧を確認してください。"))),
    }
}

fn print_intro(state: &SimulationState) {
    println!("国民経済シミュレーター (Leontief投入産出モデル版) へようこそ。");
    println!("現在 {} ヶ国が監視対象です。", state.countries.len());
    println!("help で利用可能なコマンド一覧を確認できます。");
}

fn print_help() {
    println!("利用可能なコマンド:");
    println!("  overview              各国の主要指標を一覧表示");
    println!("  inspect <国コード>     選択した国の詳細を表示");
    println!("  advance <n>           n ティック進める (省略時は1)");
    println!("  report                直近ティックの診断ログを表示");
    println!("  quit                  終了");
}

fn print_overview(state: &SimulationState) {
    println!(
        "ティック {} | {:<6} | {:>12} | {:>8} | {:>6} | {:>6}",
        state.tick, "国コード", "GDP", "失業率", "正当性", "不安"
    );
    for country in &state.countries {
        println!(
            "         | {:<6} | {:>12.1} | {:>7.2}% | {:>6.1} | {:>6.1}",
            country.code,
            country.gdp,
            country.unemployment_rate() * 100.0,
            country.legitimacy,
            country.average_unrest,
        );
    }
}

fn print_country_details(state: &SimulationState, idx: usize) {
    let country = &state.countries[idx];
    println!("-- {} ({}) の状況 --", country.name, country.code);
    println!("GDP: {:.1} / 前期比 {:.2}%", country.gdp, (country.gdp / country.previous_gdp.max(1e-6) - 1.0) * 100.0);
    println!("失業率: {:.2}%", country.unemployment_rate() * 100.0);
    println!("年間インフレ率: {:.2}%", country.annual_inflation() * 100.0);
    println!("債務/GDP: {:.2} (持続可能: {})", country.debt_to_gdp(), country.debt_sustainable(1.5));
    println!("正当性: {:.1} / 平均不安: {:.1}", country.legitimacy, country.average_unrest);
    println!("価格:");
    for commodity in Commodity::ALL {
        println!("  {:<14} {:>10.2}", commodity.key(), country.prices[commodity.index()]);
    }
}

fn print_report(state: &SimulationState) {
    if state.reports.is_empty() {
        println!("直近ティックの診断ログはありません。");
    } else {
        println!("直近ティックの診断ログ:");
        for report in &state.reports {
            println!("- {report}");
        }
    }
}

fn print_reports(n: u64, state: &SimulationState) {
    println!("{n} ティック進行し、現在ティック {} です。", state.tick);
    if !state.reports.is_empty() {
        println!("最終ティックの診断ログ:");
        for report in &state.reports {
            println!("- {report}");
        }
    }
}

fn resolve_country_index(state: &SimulationState, token: Option<&str>) -> Result<usize> {
    let token = token.ok_or_else(|| anyhow!("国コードを指定してください。"))?;
    state
        .countries
        .iter()
        .position(|c| c.code.eq_ignore_ascii_case(token))
        .ok_or_else(|| anyhow!("国を特定できませんでした: {token}"))
}
