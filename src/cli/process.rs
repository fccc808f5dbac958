//! `process` command: run one saved model response through the director

use crate::choice::{ChoicePresenter, ChoiceSelection};
use crate::cli::render::{PrintSink, TerminalChoiceView, format_state};
use crate::cli::{CliOptions, load_config};
use crate::director::Director;
use crate::storage;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Process a response, print what changed and persist the new state
pub async fn run_process(response: &str, options: &CliOptions) -> anyhow::Result<()> {
    let config = load_config(options)?;
    let state = match &options.state_path {
        Some(path) => storage::load_or_default(path)?,
        None => Default::default(),
    };

    let mut director = Director::with_state(config, state);
    director.add_sink(Arc::new(PrintSink));

    println!("[Changes]");
    let outcome = director.process_turn(response).await;
    if outcome.changes.is_empty() {
        println!("  (none)");
    }
    println!();

    if !outcome.narrative.is_empty() {
        println!("{}", outcome.narrative);
        println!();
    }

    if options.debug {
        println!("{}", format_state(director.state()));
        println!();
    }

    if let Some(path) = &options.state_path {
        storage::save_to(path, director.state())?;
        log::debug!("scene state saved to {}", path.display());
    }

    if options.interactive && !outcome.choices.is_empty() {
        let presenter = ChoicePresenter::with_view(
            director.config().choice_timeout(),
            Arc::new(TerminalChoiceView),
        );
        let session = presenter.present(outcome.choices)?;
        let input = spawn_input_reader(presenter.clone());
        let selection = session.wait().await;
        input.abort();
        print_selection(selection);
    }

    Ok(())
}

/// Route stdin lines to the presenter until one of them is accepted
fn spawn_input_reader(presenter: ChoicePresenter) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            let result = if line.is_empty() {
                presenter.dismiss()
            } else if let Ok(number) = line.parse::<usize>()
                && number >= 1
            {
                presenter.select(number - 1)
            } else {
                presenter.submit_custom(line)
            };
            match result {
                Ok(()) => break,
                Err(err) => println!("{err}"),
            }
        }
    })
}

fn print_selection(selection: Option<ChoiceSelection>) {
    match selection {
        Some(selection) if selection.is_custom => println!("Next turn (custom): {}", selection.text),
        Some(selection) => println!("Next turn: {}", selection.text),
        None => println!("No choice made."),
    }
}
