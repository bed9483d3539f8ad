use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::{json, Value};
use std::error::Error;
use std::fs;
use vistara_style_lib::render::page;
use vistara_style_lib::{EngineConfig, StyleEngine, TokenMap};

const VISTARA_INTRO: &str = r#"
   _   ___     __                  ____  __        __
  | | / (_)__ / /____ ________ _  / __/ / /___ __ / /__
  | |/ / (_-</ __/ _ `/ __/ _ `/ _\ \  / __/ // // / -_)
  |___/_/___/\__/\_,_/_/  \_,_/ /___/  \__/\_, //_/\__/
                                          /___/
    Vistara Style - component styles to shared CSS rules
"#;

#[derive(Parser)]
#[command(name = "vistara-style")]
#[command(about = "Normalize component style descriptors into inline styles and shared CSS rules")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    engine: EngineArgs,

    /// Print the banner on stderr.
    #[arg(long, global = true)]
    intro: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a JSON file holding one descriptor or an array of descriptors.
    Resolve {
        /// Input file name.
        file: String,

        /// Minify the printed stylesheet.
        #[arg(long)]
        minify: bool,
    },
    /// Style every `data-style` element of an HTML page and print the page.
    Render {
        /// Input file name.
        file: String,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Prefix of generated class names.
    #[arg(
        long,
        global = true,
        default_value = vistara_style_lib::config::DEFAULT_CLASS_PREFIX,
        value_parser = parse_prefix
    )]
    prefix: String,

    /// Hex digits of the content hash kept in class names.
    #[arg(long, global = true, default_value_t = vistara_style_lib::config::DEFAULT_HASH_LEN)]
    hash_len: usize,

    /// Rewrite known literal values to the built-in theme tokens.
    #[arg(long, global = true)]
    tokens: bool,

    /// Warn about hardcoded colours and pixel lengths.
    #[arg(long, global = true)]
    audit: bool,

    /// Check generated rules with LightningCSS before injecting them.
    #[arg(long, global = true)]
    validate: bool,
}

fn parse_prefix(prefix: &str) -> Result<String, String> {
    vistara_style_lib::config::validate_class_prefix(prefix)
        .map(|()| prefix.to_string())
        .map_err(|e| e.to_string())
}

impl EngineArgs {
    fn to_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default().with_prefix(self.prefix.clone());
        config.hash_len = self.hash_len;
        config.audit_hardcoded = self.audit;
        config.validate_css = self.validate;
        if self.tokens {
            config = config.with_tokens(TokenMap::builtin());
        }
        config
    }
}

fn resolve_file(path: &str, config: EngineConfig, minify: bool) -> Result<(), Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    let input: Value = serde_json::from_str(&content)?;
    let descriptors = match input {
        Value::Array(items) => items,
        single => vec![single],
    };

    let mut engine = StyleEngine::new(config);
    for (index, descriptor) in descriptors.iter().enumerate() {
        let resolved = engine
            .resolve_labeled(&format!("#{}", index), descriptor)
            .map_err(|e| format!("descriptor #{}: {}", index, e))?;
        let line = json!({
            "className": resolved.class_name,
            "style": resolved.style,
        });
        println!("{}", line);
    }
    info!(
        "resolved {} descriptor(s) into {} class(es)",
        descriptors.len(),
        engine.cache().len()
    );

    let css = if minify {
        engine.minified_css()?
    } else {
        engine.css_text()
    };
    if !css.is_empty() {
        println!("{}", css);
    }
    Ok(())
}

fn render_file(path: &str, config: EngineConfig) -> Result<(), Box<dyn Error>> {
    let html_content = fs::read_to_string(path)?;
    let rendered = page::render(&html_content, config)?;
    if let Some(diagnostic) = &rendered.diagnostic {
        eprintln!("warning: {}", diagnostic);
    }
    println!("{}", rendered.html);
    Ok(())
}

fn main() {
    env_logger::init();

    // parse the args given in terminal
    let cli = Cli::parse();
    if cli.intro {
        eprintln!("{}", VISTARA_INTRO);
    }

    let config = cli.engine.to_config();
    let result = match &cli.command {
        Command::Resolve { file, minify } => resolve_file(file, config, *minify),
        Command::Render { file } => render_file(file, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
