//! An interactive terminal agent backed by the GLM chat-completions API.

#[macro_use]
extern crate tracing;

mod input;

use std::io::Write as _;
use std::process::ExitCode;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use simple_agent::config::Config;
use simple_agent::core::tool::is_tool_command;
use simple_agent::core::{AgentEvent, AgentStage};
use simple_agent::logging::Logger;
use simple_agent::{Session, SessionBuilder};
use simple_agent_zhipu_model::ZhipuProvider;
use tokio::select;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::input::InputReader;

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            eprintln!(
                "Set ZHIPU_API_KEY to your API key, and optionally ZHIPU_MODEL \
                 and ZHIPU_BASE_URL."
            );
            return ExitCode::FAILURE;
        }
    };

    let logger = match Logger::install(&config.log_file) {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    info!(?config, "starting session");

    let exit_code = run(config).await;
    logger.shutdown();
    exit_code
}

async fn run(config: Config) -> ExitCode {
    let mut input = match InputReader::spawn() {
        Ok(input) => input,
        Err(err) => {
            error!("cannot start the input reader: {err}");
            eprintln!("cannot read input: {err}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("shutdown requested");
            cancel.cancel();
        }
    });

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let model_provider = ZhipuProvider::new(config.zhipu_config());
    let mut session = SessionBuilder::with_model_provider(model_provider)
        .with_cancellation_token(cancel.clone())
        .with_shell_timeout(config.shell_timeout)
        .with_max_tool_rounds(config.max_tool_rounds)
        .on_event(move |event| {
            event_tx.send(event).ok();
        })
        .build();

    println!(
        "{} Type a message, {} to run a tool directly, {} to leave.",
        "simple-agent".bright_cyan().bold(),
        "/tool <type> <name> [json-args]".bright_white(),
        "exit".bright_white()
    );

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let line = select! {
            line = input.next_line() => line,
            _ = cancel.cancelled() => break,
        };
        let line = match line {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                error!("error reading input: {err}");
                eprintln!("error reading input: {err}");
                return ExitCode::FAILURE;
            }
            None => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        if is_tool_command(line) {
            run_tool_command(&session, line, &cancel).await;
        } else {
            run_turn(&mut session, line, &mut event_rx, &cancel).await;
        }
        if cancel.is_cancelled() {
            break;
        }
    }

    println!("Bye!");
    ExitCode::SUCCESS
}

async fn run_turn(
    session: &mut Session,
    line: &str,
    event_rx: &mut mpsc::UnboundedReceiver<AgentEvent>,
    cancel: &CancellationToken,
) {
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(progress_style);
    progress_bar.set_message("🤔 Thinking...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let turn = session.send_message(line);
    tokio::pin!(turn);

    let result = loop {
        select! {
            result = &mut turn => break Some(result),
            Some(event) = event_rx.recv() => {
                print_event(&progress_bar, event);
            }
            _ = cancel.cancelled() => break None,
        }
    };
    while let Ok(event) = event_rx.try_recv() {
        print_event(&progress_bar, event);
    }
    progress_bar.finish_and_clear();

    match result {
        Some(Ok(reply)) => {
            println!("{}🤖 {}", BAR_CHAR.bright_cyan(), reply.content.bright_white());
        }
        Some(Err(err)) => {
            println!("{}❌ {}", BAR_CHAR.bright_red(), err.bright_red());
        }
        None => {
            println!("{}⏹  Cancelled.", BAR_CHAR.bright_yellow());
        }
    }
}

async fn run_tool_command(session: &Session, line: &str, cancel: &CancellationToken) {
    let result = select! {
        result = session.run_tool_command(line) => result,
        _ = cancel.cancelled() => return,
    };
    match result {
        Ok(result) => {
            if let Some(err) = &result.error {
                println!("{}✗ {}", BAR_CHAR.bright_red(), err.bright_red());
            }
            if !result.result.is_empty() {
                println!("{}", result.result.trim_end());
            }
        }
        Err(err) => {
            println!("{}❌ {}", BAR_CHAR.bright_red(), err.bright_red());
        }
    }
}

fn print_event(progress_bar: &ProgressBar, event: AgentEvent) {
    match event {
        AgentEvent::StageChanged(AgentStage::ModelThinking) => {
            progress_bar.set_message("🤔 Thinking...");
        }
        AgentEvent::StageChanged(AgentStage::RunningTools) => {
            progress_bar.set_message("🔧 Running tools...");
        }
        AgentEvent::StageChanged(AgentStage::Idle) => {}
        AgentEvent::ToolCall { invocation } => {
            progress_bar.suspend(|| {
                let bar = BAR_CHAR.bright_yellow();
                println!("{bar}🔧 {}", invocation.bright_white().bold());
                if !invocation.thought.is_empty() {
                    println!("{bar}   {}", invocation.thought.dimmed());
                }
            });
        }
        AgentEvent::ToolResult { result, .. } => {
            progress_bar.suspend(|| match &result.error {
                None => println!("{}   {}", BAR_CHAR.bright_yellow(), "✓ done".green()),
                Some(err) => println!(
                    "{}   {} {}",
                    BAR_CHAR.bright_yellow(),
                    "✗".red(),
                    err.red()
                ),
            });
        }
        AgentEvent::ToolRoundLimitReached { rounds } => {
            progress_bar.suspend(|| {
                println!(
                    "{}⚠️  Stopped after {rounds} tool rounds.",
                    BAR_CHAR.bright_yellow()
                );
            });
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("cannot listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("cannot listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
