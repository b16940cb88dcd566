//! CLI commands

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::backend::BackendClient;
use crate::chat::{render_body, ChatSession, ConversationEntry, Sender};
use crate::config::Config;
use crate::schema::{
    AuthType, DbCredentials, DraftStore, KeyValue, SchemaDocument, TrainingPair,
};

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "Define data-source schemas and chat with them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config path (default: ~/.gateway/config.yml)
    #[arg(long)]
    config: Option<String>,

    /// Draft path (default: ~/.gateway/draft.yml)
    #[arg(long)]
    draft: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fresh schema draft
    Init {
        /// Schema name (the save/retrieve key)
        name: String,
    },

    /// Print the draft and its validation status
    Show,

    /// Set the SFTP connection details
    Sftp {
        #[arg(long)]
        host: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        port: String,
    },

    /// Edit the schema field list
    Field {
        #[command(subcommand)]
        command: FieldCommand,
    },

    /// Edit the training sets
    Training {
        #[command(subcommand)]
        command: TrainingCommand,
    },

    /// Edit the LLM endpoint
    Llm {
        #[command(subcommand)]
        command: LlmCommand,
    },

    /// Edit the database connection
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },

    /// Check the draft against the schema invariants
    Validate,

    /// Validate the draft and submit it to the backend
    Save,

    /// Retrieve a schema and overwrite the draft with it
    Retrieve {
        /// Schema name (defaults to the draft's name)
        name: Option<String>,
    },

    /// Chat with the data source described by the draft
    Chat,
}

#[derive(Subcommand)]
enum FieldCommand {
    /// Add a field
    Add { name: String },
    /// Rename a field by row id
    Set { id: u64, name: String },
    /// Remove a field by row id
    Remove { id: u64 },
    /// List fields with their row ids
    List,
}

#[derive(Subcommand)]
enum TrainingCommand {
    /// Add an input/output example pair
    Add {
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
    },
    /// Remove a training set by row id
    Remove { id: u64 },
    /// List training sets with their row ids
    List,
}

#[derive(Subcommand)]
enum LlmCommand {
    /// Set the endpoint URL (an empty URL disables the endpoint)
    Url { url: String },
    /// Set the auth type: none, header, or client
    Auth {
        auth_type: String,
        /// Header value for the `header` auth type (e.g. "Bearer ...")
        #[arg(long)]
        auth_header: Option<String>,
        #[arg(long)]
        client_id: Option<String>,
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Set the request body template and its key paths
    Body {
        #[arg(long)]
        sample_json: Option<String>,
        #[arg(long)]
        query_key: Option<String>,
        #[arg(long)]
        response_key: Option<String>,
    },
    /// Edit extra headers
    Header {
        #[command(subcommand)]
        command: RowCommand,
    },
    /// Edit extra query parameters
    Param {
        #[command(subcommand)]
        command: RowCommand,
    },
}

#[derive(Subcommand)]
enum RowCommand {
    Add { key: String, value: String },
    Remove { id: u64 },
    List,
}

#[derive(Subcommand)]
enum DbCommand {
    /// Set all database connection fields
    Set {
        #[arg(long)]
        host: String,
        #[arg(long)]
        port: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        database: String,
    },
    /// Clear the database connection
    Clear,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let store = DraftStore::open(cli.draft.as_deref())?;
    let mut doc = store.load()?;

    // Create a multi-threaded runtime for CLI operations
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match cli.command {
            Commands::Init { name } => {
                doc = SchemaDocument::new(name);
                store.save(&doc)?;
                println!("Started draft for schema '{}'", doc.name);
                Ok(())
            }

            Commands::Show => {
                print_draft(&doc);
                Ok(())
            }

            Commands::Sftp {
                host,
                username,
                password,
                port,
            } => {
                doc.sftp.host = host;
                doc.sftp.username = username;
                doc.sftp.password = password;
                doc.sftp.port = port;
                store.save(&doc)?;
                println!("SFTP connection details updated");
                Ok(())
            }

            Commands::Field { command } => {
                match command {
                    FieldCommand::Add { name } => {
                        let id = doc.fields.add(name);
                        store.save(&doc)?;
                        println!("Added field [{}]", id);
                    }
                    FieldCommand::Set { id, name } => match doc.fields.get_mut(id) {
                        Some(value) => {
                            *value = name;
                            store.save(&doc)?;
                            println!("Updated field [{}]", id);
                        }
                        None => println!("No field with id {}", id),
                    },
                    FieldCommand::Remove { id } => match doc.fields.remove(id) {
                        Some(name) => {
                            store.save(&doc)?;
                            println!("Removed field [{}] {}", id, name);
                        }
                        None => println!("No field with id {}", id),
                    },
                    FieldCommand::List => {
                        if doc.fields.is_empty() {
                            println!("No fields defined");
                        }
                        for row in doc.fields.iter() {
                            println!("[{}] {}", row.id, row.value);
                        }
                    }
                }
                Ok(())
            }

            Commands::Training { command } => {
                match command {
                    TrainingCommand::Add { input, output } => {
                        let id = doc.training_sets.add(TrainingPair { input, output });
                        store.save(&doc)?;
                        println!("Added training set [{}]", id);
                    }
                    TrainingCommand::Remove { id } => match doc.training_sets.remove(id) {
                        Some(_) => {
                            store.save(&doc)?;
                            println!("Removed training set [{}]", id);
                        }
                        None => println!("No training set with id {}", id),
                    },
                    TrainingCommand::List => {
                        if doc.training_sets.is_empty() {
                            println!("No training sets defined");
                        }
                        for row in doc.training_sets.iter() {
                            println!("[{}] {} -> {}", row.id, row.value.input, row.value.output);
                        }
                    }
                }
                Ok(())
            }

            Commands::Llm { command } => {
                match command {
                    LlmCommand::Url { url } => {
                        doc.llm_endpoint.url = url;
                        store.save(&doc)?;
                        if doc.llm_endpoint.url.trim().is_empty() {
                            println!("LLM endpoint disabled");
                        } else {
                            println!("LLM endpoint URL set");
                        }
                    }
                    LlmCommand::Auth {
                        auth_type,
                        auth_header,
                        client_id,
                        client_secret,
                    } => {
                        doc.llm_endpoint.auth_type = AuthType::from_str(&auth_type)?;
                        if let Some(value) = auth_header {
                            doc.llm_endpoint.credentials.auth_header = value;
                        }
                        if let Some(value) = client_id {
                            doc.llm_endpoint.credentials.client_id = value;
                        }
                        if let Some(value) = client_secret {
                            doc.llm_endpoint.credentials.client_secret = value;
                        }
                        store.save(&doc)?;
                        println!("Auth set to {}", doc.llm_endpoint.auth_type.as_str());
                    }
                    LlmCommand::Body {
                        sample_json,
                        query_key,
                        response_key,
                    } => {
                        if let Some(value) = sample_json {
                            doc.llm_endpoint.body.sample_json = value;
                        }
                        if let Some(value) = query_key {
                            doc.llm_endpoint.body.query_key = value;
                        }
                        if let Some(value) = response_key {
                            doc.llm_endpoint.body.response_key = value;
                        }
                        store.save(&doc)?;
                        println!("Request body template updated");
                    }
                    LlmCommand::Header { command } => {
                        run_row_command(command, &mut doc.llm_endpoint.extra_headers, "header");
                        store.save(&doc)?;
                    }
                    LlmCommand::Param { command } => {
                        run_row_command(
                            command,
                            &mut doc.llm_endpoint.extra_query_params,
                            "query parameter",
                        );
                        store.save(&doc)?;
                    }
                }
                Ok(())
            }

            Commands::Db { command } => {
                match command {
                    DbCommand::Set {
                        host,
                        port,
                        user,
                        password,
                        database,
                    } => {
                        doc.db_credentials = DbCredentials {
                            host,
                            port,
                            user,
                            password,
                            database,
                        };
                        println!("Database connection updated");
                    }
                    DbCommand::Clear => {
                        doc.db_credentials = DbCredentials::default();
                        println!("Database connection cleared");
                    }
                }
                store.save(&doc)?;
                Ok(())
            }

            Commands::Validate => {
                match doc.validate() {
                    Ok(()) => println!("Draft is valid"),
                    Err(err) => println!("Invalid: {}", err),
                }
                Ok(())
            }

            Commands::Save => {
                if let Err(err) = doc.validate() {
                    println!("Invalid: {}", err);
                    return Ok(());
                }
                if !doc.sftp.is_complete() {
                    println!("Please fill out all SFTP Connection Details to save the schema.");
                    return Ok(());
                }

                let client = BackendClient::new(config.backend_url.clone());
                match client.save_schema(&doc.to_wire()).await {
                    Ok(message) => println!("{}", message),
                    Err(err) => println!("Error: {}", err),
                }
                Ok(())
            }

            Commands::Retrieve { name } => {
                let name = name.unwrap_or_else(|| doc.name.trim().to_string());
                if name.trim().is_empty() {
                    println!("Please enter a Schema Name to retrieve.");
                    return Ok(());
                }
                if !doc.sftp.is_complete() {
                    println!(
                        "Please fill out all SFTP Connection Details to retrieve the schema."
                    );
                    return Ok(());
                }

                let client = BackendClient::new(config.backend_url.clone());
                match client.get_schema(&name, &doc.sftp).await {
                    Ok(wire) => {
                        doc.apply_wire(wire);
                        store.save(&doc)?;
                        println!("Schema for '{}' retrieved successfully!", name);
                    }
                    Err(err) => println!("Error: {}", err),
                }
                Ok(())
            }

            Commands::Chat => {
                if let Err(err) = doc.validate() {
                    println!("Invalid: {}", err);
                    return Ok(());
                }

                let client = BackendClient::new(config.backend_url.clone());
                run_chat(&client, &doc).await
            }
        }
    })
}

fn run_row_command(command: RowCommand, rows: &mut crate::schema::RowList<KeyValue>, noun: &str) {
    match command {
        RowCommand::Add { key, value } => {
            let id = rows.add(KeyValue { key, value });
            println!("Added {} [{}]", noun, id);
        }
        RowCommand::Remove { id } => match rows.remove(id) {
            Some(kv) => println!("Removed {} [{}] {}", noun, id, kv.key),
            None => println!("No {} with id {}", noun, id),
        },
        RowCommand::List => {
            if rows.is_empty() {
                println!("No {}s defined", noun);
            }
            for row in rows.iter() {
                println!("[{}] {}: {}", row.id, row.value.key, row.value.value);
            }
        }
    }
}

fn print_draft(doc: &SchemaDocument) {
    println!("Schema: {}", if doc.name.is_empty() { "(unnamed)" } else { &doc.name });
    println!(
        "SFTP:   {}",
        if doc.sftp.is_complete() { "configured" } else { "incomplete" }
    );
    println!("Fields:");
    for row in doc.fields.iter() {
        println!("  [{}] {}", row.id, row.value);
    }
    println!("Training sets: {}", doc.training_sets.len());
    if doc.llm_endpoint.url.trim().is_empty() {
        println!("LLM endpoint: none");
    } else {
        println!(
            "LLM endpoint: {} ({})",
            doc.llm_endpoint.url,
            doc.llm_endpoint.auth_type.as_str()
        );
    }
    println!(
        "Database: {}",
        if doc.db_credentials.is_empty() { "none" } else { "configured" }
    );
    match doc.validate() {
        Ok(()) => println!("Status: valid"),
        Err(err) => println!("Status: invalid ({})", err),
    }
}

/// Interactive chat loop. One query in flight at a time; the loop itself
/// is what keeps invocations from overlapping.
async fn run_chat(client: &BackendClient, doc: &SchemaDocument) -> Result<()> {
    let mut session = ChatSession::new(doc.to_wire());
    println!(
        "Chatting with '{}'. Type a query, or 'exit' to leave.",
        session.schema().name
    );

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }

        session.begin(query);
        if let Some(entry) = session.last() {
            print_entry(entry);
        }
        let outcome = client.chat_query(query, session.schema()).await;
        session.resolve(outcome);
        if let Some(entry) = session.last() {
            print_entry(entry);
        }
    }

    Ok(())
}

fn print_entry(entry: &ConversationEntry) {
    let who = match entry.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    println!("[{}] {}: {}", entry.at.format("%H:%M:%S"), who, render_body(&entry.body));
}
