mod world;

use std::{
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::Arc,
};

use bumpalo::Bump;
use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, DescriptionMode, EditCommand, Emacs,
    IdeMenu, KeyCode, KeyModifiers, Keybindings, MenuBuilder, Reedline, ReedlineEvent,
    ReedlineMenu, Signal, default_emacs_keybindings,
};
use vigil::render_error;
use vigil_core::{Sandbox, SandboxOptions, parser, values::Value};

use crate::world::{JsonWorld, from_json};

/// Vigil - sandboxed expressions for game content
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(about = "Evaluate content expressions against JSON fixtures", long_about = None)]
struct Args {
    /// JSON file bound to `container` (and `this`)
    #[arg(long)]
    container: Option<PathBuf>,

    /// JSON file bound to `player`
    #[arg(long)]
    player: Option<PathBuf>,

    /// JSON file of entity collections searched by the find* functions
    #[arg(long)]
    world: Option<PathBuf>,

    /// Maximum number of nodes visited per evaluation
    #[arg(long, default_value_t = SandboxOptions::default().max_nodes)]
    max_nodes: usize,

    /// Maximum nesting depth
    #[arg(long, default_value_t = SandboxOptions::default().max_depth)]
    max_depth: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Print the adapted syntax tree (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Expression to evaluate (if not provided, reads from stdin)
    expression: Option<String>,
}

struct Session {
    sandbox: Sandbox,
    container: Value,
    player: Value,
    json: bool,
    debug_parse: bool,
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text)
        .into_diagnostic()
        .wrap_err_with(|| format!("parsing {}", path.display()))
}

fn load_object(path: Option<&Path>, kind: &str) -> Result<Value> {
    match path {
        Some(path) => Ok(from_json(&read_json(path)?, kind)),
        None => Ok(Value::Null),
    }
}

impl Session {
    fn from_args(args: &Args) -> Result<Self> {
        let options = SandboxOptions {
            max_nodes: args.max_nodes,
            max_depth: args.max_depth,
            ..SandboxOptions::default()
        };
        let mut sandbox = Sandbox::new(options);
        if let Some(path) = &args.world {
            let world = JsonWorld::from_json(&read_json(path)?);
            sandbox = sandbox.with_finder(Arc::new(world));
        }
        Ok(Self {
            sandbox,
            container: load_object(args.container.as_deref(), "Room")?,
            player: load_object(args.player.as_deref(), "Player")?,
            json: args.json,
            debug_parse: args.debug_parse,
        })
    }

    fn global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .sandbox
            .registry()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        names.extend(["container", "player", "this"].map(String::from));
        names
    }

    fn print_tree(&self, input: &str) {
        let arena = Bump::new();
        let source = arena.alloc_str(input);
        let adapted = parser::parse(&arena, source).and_then(|script| parser::adapt(&arena, &script));
        match adapted {
            Ok(expr) => {
                println!("=== Adapted expression ===");
                println!("{:#?}", expr.expr);
                println!();
            }
            // Reported again by the evaluation that follows.
            Err(e) => tracing::debug!(error = %e, "parse failed"),
        }
    }

    /// Evaluate one line. Returns whether it succeeded.
    fn interpret_input(&self, input: &str) -> bool {
        if input.trim().is_empty() {
            return true;
        }
        if self.debug_parse {
            self.print_tree(input);
        }
        match self.sandbox.evaluate(input, &self.container, &self.player) {
            Ok(result) if self.json => {
                match serde_json::to_string(&result) {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("Could not serialize result: {}", e),
                }
                true
            }
            Ok(result) => {
                println!("{}", result);
                true
            }
            Err(e) => {
                render_error(&e, input);
                false
            }
        }
    }
}

fn add_menu_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline(names: Vec<String>) -> (Reedline, DefaultPrompt) {
    let completer = Box::new({
        let mut completions = DefaultCompleter::with_inclusions(&['_']);
        completions.insert(names);
        completions
    });

    let ide_menu = IdeMenu::default()
        .with_name("completion_menu")
        .with_min_completion_width(0)
        .with_max_completion_width(50)
        .with_max_completion_height(u16::MAX)
        .with_padding(0)
        .with_cursor_offset(0)
        .with_description_mode(DescriptionMode::PreferRight)
        .with_correct_cursor_pos(false);

    let mut keybindings = default_emacs_keybindings();
    add_menu_keybindings(&mut keybindings);

    let line_editor = Reedline::create()
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(Box::new(ide_menu)))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = DefaultPrompt::new(DefaultPromptSegment::Empty, DefaultPromptSegment::Empty);

    (line_editor, prompt)
}

fn main() -> Result<()> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level, warn by default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let session = Session::from_args(&args)?;

    if let Some(expr) = &args.expression {
        if !session.interpret_input(expr) {
            std::process::exit(1);
        }
        return Ok(());
    }

    if atty::is(atty::Stream::Stdin) {
        let (mut line_editor, prompt) = setup_reedline(session.global_names());

        println!("Vigil REPL - Type expressions to evaluate (Ctrl+D or Ctrl+C to exit)");

        loop {
            let signal = match line_editor.read_line(&prompt) {
                Ok(signal) => signal,
                Err(e) => {
                    eprintln!("Reedline error: {e}");
                    return Ok(());
                }
            };

            match signal {
                Signal::Success(buffer) => {
                    session.interpret_input(&buffer);
                }
                Signal::CtrlD | Signal::CtrlC => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            }
        }
    }

    // Pipe mode: one expression per line, non-zero exit if any failed.
    let reader = BufReader::new(std::io::stdin().lock());
    let mut failed = false;
    for line in reader.lines() {
        let line = line
            .into_diagnostic()
            .wrap_err("reading expression from stdin")?;
        failed |= !session.interpret_input(&line);
    }
    if failed {
        std::process::exit(1);
    }

    Ok(())
}
