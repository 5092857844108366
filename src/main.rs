// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use quill_rs::blog::{BlogPipeline, BlogRequest, Usecase};
use quill_rs::config::Settings;
use quill_rs::llm::openai::OpenAIFactory;
use quill_rs::llm::{Model, ModelFactory};
use quill_rs::server;

use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a blog and print the final state as JSON
    Generate {
        /// Blog topic
        #[arg(short, long)]
        topic: String,

        /// Translate into this language (hindi, french, hausa, yoruba, igbo)
        #[arg(short, long)]
        language: Option<String>,

        /// The model to use
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Serve the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print a pipeline topology as Graphviz dot
    Graph {
        /// Show the translation topology instead of the topic-only one
        #[arg(short, long)]
        language: bool,
    },
}

/// Placeholder model for rendering topologies without credentials
struct OfflineModel;

#[async_trait::async_trait]
impl Model for OfflineModel {
    async fn generate(
        &self,
        _prompt: &str,
        _config: &quill_rs::llm::GenerationConfig,
    ) -> Result<String, quill_rs::error::CapabilityError> {
        Err(quill_rs::error::CapabilityError::unknown("offline"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut settings = Settings::load_or_default(args.config.as_deref())?;

    match args.command {
        Commands::Generate {
            topic,
            language,
            model,
        } => {
            let request = BlogRequest::new(topic, language.as_deref())?;
            let model_name = model.unwrap_or_else(|| settings.model.clone());
            log::info!("Using model: {}", model_name);

            let model = OpenAIFactory.create(&model_name, settings.temperature)?;
            let state = BlogPipeline::from_settings(model, &settings)
                .generate(&request)
                .await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.port = port;
            }
            server::serve(settings, Arc::new(OpenAIFactory)).await?;
        }
        Commands::Graph { language } => {
            let usecase = if language {
                Usecase::Language
            } else {
                Usecase::Topic
            };
            let graph = BlogPipeline::new(Arc::new(OfflineModel)).setup_graph(usecase)?;
            log::info!("Rendering graph '{}'", graph.name());
            println!("{}", graph.to_dot());
        }
    }

    Ok(())
}
