use std::io::{self, IsTerminal, Read, Write as _};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute, queue,
    terminal::{
        disable_raw_mode, enable_raw_mode, BeginSynchronizedUpdate, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};

use hxv::app::{App, Session};
use hxv::config::ViewerConfig;
use hxv::logging::{self, LogTarget};
use hxv::ui::frame_lines;

fn main() -> Result<ExitCode> {
    let config = ViewerConfig::parse();

    let target = match (&config.log_file, config.dump) {
        (Some(path), _) => LogTarget::File(path),
        (None, Some(_)) => LogTarget::Stderr,
        (None, None) => LogTarget::Off,
    };
    // Dropped when main returns, flushing buffered file output
    let _guard = logging::init(target)?;

    // Piped stdin is used only when no file is given
    let stdin_data = if config.file.is_none() && !io::stdin().is_terminal() {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        Some(data)
    } else {
        None
    };

    let rows = config.dump.unwrap_or(1);
    let mut session = Session::new(config.columns, rows).with_code_page(config.encoding);
    session
        .open(stdin_data, config.file.as_deref(), config.writable)
        .with_context(|| match &config.file {
            Some(path) => format!("cannot open {}", path.display()),
            None => "no input: pass a FILE or pipe data on stdin".to_string(),
        })?;
    session.jump_to(config.offset);

    if config.dump.is_some() {
        let frame = session.build_frame();
        let mut stdout = io::stdout().lock();
        for line in frame_lines(&frame) {
            writeln!(stdout, "{}", line)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Raw mode + alternate screen, restored even when the loop fails
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, session);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "viewer stopped");
        eprintln!("Error: {}", e);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, session: Session) -> Result<()> {
    let title = format!("hxv - {}", session.source_label());
    execute!(terminal.backend_mut(), SetTitle(&title))?;

    let mut app = App::new(session);
    loop {
        queue!(terminal.backend_mut(), BeginSynchronizedUpdate)?;
        terminal.draw(|f| app.draw(f))?;
        queue!(terminal.backend_mut(), EndSynchronizedUpdate)?;
        terminal.backend_mut().flush()?;

        app.handle_event()?;

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
