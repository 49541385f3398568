//! `unillm` command-line front end
//!
//! Every subcommand builds a [`GenerationRequest`], sends it through the
//! fallback facade and reports which provider answered.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use unillm::defaults;
use unillm::prompts;
use unillm::telemetry::{OutputFormat, TelemetryConfig, init_subscriber};
use unillm::{
    ChatMessage, FinishReason, GenerationRequest, GenerationResponse, LlmError, Settings,
    StreamItem, UnifiedLlm, Usage,
};

#[derive(Parser, Debug)]
#[command(
    name = "unillm",
    version,
    about = "Talk to several LLM providers through one interface, with automatic fallback"
)]
struct Cli {
    /// Provider to try first (openai, groq, lmstudio, anthropic, gemini)
    #[arg(long, global = true, env = "UNILLM_PROVIDER")]
    provider: Option<String>,

    #[arg(long, global = true, default_value_t = defaults::TEMPERATURE)]
    temperature: f32,

    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Print the answer as it is generated
    #[arg(long, global = true)]
    stream: bool,

    /// TOML provider configuration; the environment is used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat; type `exit` or `quit` to leave
    Chat {
        /// System prompt for the whole conversation
        #[arg(long)]
        system: Option<String>,
    },
    /// Send one prompt
    Ask {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Summarize text from the command line or a file
    Summarize {
        #[arg(long, conflicts_with = "input_file", required_unless_present = "input_file")]
        text: Option<String>,
        #[arg(long)]
        input_file: Option<PathBuf>,
        /// Tone of the summary (e.g. simple, executive)
        #[arg(long, default_value = prompts::DEFAULT_TONE)]
        tone: String,
    },
    /// Explain a topic at a given level
    Tutor {
        topic: String,
        #[arg(long, default_value = prompts::DEFAULT_LEVEL)]
        level: String,
    },
    /// Generate a short quiz about a topic
    Quiz { topic: String },
    /// List configured providers in fallback order
    Providers,
    /// Serve the HTTP chat API
    #[cfg(feature = "server")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), LlmError> {
    let telemetry = TelemetryConfig::builder()
        .log_level_str(&cli.log_level)?
        .output_format(if cli.json_logs {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        })
        .build();
    init_subscriber(telemetry)?;

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::from_env()?,
    };
    let llm = UnifiedLlm::from_settings(&settings)?;
    let options = RequestOptions {
        provider: cli.provider.clone(),
        temperature: cli.temperature,
        max_tokens: cli.max_tokens,
        stream: cli.stream,
    };

    match cli.command {
        Command::Chat { system } => chat_loop(&llm, &options, system).await,
        Command::Ask { prompt } => {
            let prompt = prompt.join(" ");
            one_shot(&llm, &options, &prompt).await
        }
        Command::Summarize {
            text,
            input_file,
            tone,
        } => {
            let text = match (text, input_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path).await?,
                (None, None) => String::new(),
            };
            if text.trim().is_empty() {
                return Err(LlmError::InvalidRequest("no text to summarize".to_string()));
            }
            let options = RequestOptions {
                max_tokens: options.max_tokens.or(Some(defaults::MAX_TOKENS)),
                ..options
            };
            one_shot(&llm, &options, &prompts::summarize_prompt(&text, &tone)).await
        }
        Command::Tutor { topic, level } => {
            one_shot(&llm, &options, &prompts::tutor_prompt(&topic, &level)).await
        }
        Command::Quiz { topic } => one_shot(&llm, &options, &prompts::quiz_prompt(&topic)).await,
        Command::Providers => {
            for (i, adapter) in llm.registry().adapters().iter().enumerate() {
                println!("{}. {} ({})", i + 1, adapter.provider_id(), adapter.model());
            }
            Ok(())
        }
        #[cfg(feature = "server")]
        Command::Serve { addr } => unillm::server_adapters::axum::serve(llm, addr).await,
    }
}

#[derive(Debug, Clone)]
struct RequestOptions {
    provider: Option<String>,
    temperature: f32,
    max_tokens: Option<u32>,
    stream: bool,
}

impl RequestOptions {
    fn request(&self, messages: Vec<ChatMessage>) -> Result<GenerationRequest, LlmError> {
        let mut builder = GenerationRequest::builder()
            .messages(messages)
            .temperature(self.temperature)
            .stream(self.stream);
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        builder.build()
    }
}

async fn one_shot(llm: &UnifiedLlm, options: &RequestOptions, prompt: &str) -> Result<(), LlmError> {
    let request = options.request(vec![ChatMessage::user(prompt)])?;
    respond(llm, options, &request).await.map(|_| ())
}

async fn chat_loop(
    llm: &UnifiedLlm,
    options: &RequestOptions,
    system: Option<String>,
) -> Result<(), LlmError> {
    eprintln!(
        "Active providers: {}",
        llm.registry().provider_ids().join(", ")
    );
    eprintln!("Type 'exit' or 'quit' to leave.");

    let mut history: Vec<ChatMessage> = system.into_iter().map(ChatMessage::system).collect();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\nYou> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        history.push(ChatMessage::user(input));
        let request = options.request(history.clone())?;
        match respond(llm, options, &request).await {
            Ok(response) => history.push(ChatMessage::assistant(response.content)),
            Err(e) => {
                history.pop();
                report_error(&e);
            }
        }
    }
    Ok(())
}

/// Send `request`, print the answer and the serving provider.
async fn respond(
    llm: &UnifiedLlm,
    options: &RequestOptions,
    request: &GenerationRequest,
) -> Result<GenerationResponse, LlmError> {
    let provider = options.provider.as_deref();
    let mut stdout = tokio::io::stdout();

    let response = if options.stream {
        let mut stream = llm.generate_streaming(request, provider).await?;
        let mut response =
            GenerationResponse::new(String::new(), "", "", Usage::unknown(), FinishReason::Unknown);
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    stdout.write_all(b"\n").await?;
                    return Err(e);
                }
            };
            response.provider = chunk.provider;
            response.model = chunk.model;
            response.fallback_attempts.extend(chunk.fallback_attempts);
            match chunk.item {
                StreamItem::TextFragment { text } => {
                    stdout.write_all(text.as_bytes()).await?;
                    stdout.flush().await?;
                    response.content.push_str(&text);
                }
                StreamItem::UsageSummary {
                    usage,
                    finish_reason,
                } => {
                    response.usage = usage;
                    response.finish_reason = finish_reason;
                }
            }
        }
        stdout.write_all(b"\n").await?;
        response
    } else {
        let response = llm.generate(request, provider).await?;
        stdout.write_all(response.content.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        response
    };
    stdout.flush().await?;

    eprintln!(
        "\nGenerated by {} ({}) | {}",
        response.provider,
        response.model,
        describe_usage(&response.usage)
    );
    for attempt in &response.fallback_attempts {
        eprintln!("  skipped {attempt}");
    }
    Ok(response)
}

fn describe_usage(usage: &Usage) -> String {
    let count = |n: Option<u32>| n.map_or_else(|| "?".to_string(), |n| n.to_string());
    if usage.is_unknown() {
        return "usage not reported".to_string();
    }
    format!(
        "tokens: {} in, {} out, {} total",
        count(usage.input_tokens),
        count(usage.output_tokens),
        count(usage.total_tokens)
    )
}

fn report_error(error: &LlmError) {
    match error {
        LlmError::AllProvidersExhausted { attempts } => {
            eprintln!("All providers failed:");
            for attempt in attempts {
                eprintln!("  - {attempt}");
            }
        }
        other => eprintln!("Error: {other}"),
    }
}
