//! Multisig vault CLI application
//!
//! Command-line front end for the threshold-signature vault.

use clap::{Parser, Subcommand};
use multisig_vault::api::{create_router, ApiState};
use multisig_vault::cli::{self, AppState};
use multisig_vault::crypto::Address;
use multisig_vault::multisig::{Vault, VaultState};
use multisig_vault::storage::{Storage, StorageConfig};
use multisig_vault::transfer::AssetBook;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(version = "0.1.0")]
#[command(about = "Threshold-signature transaction vault", long_about = None)]
struct Cli {
    /// Data directory for vault storage
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the signer set and threshold
    Init {
        /// Comma-separated signer addresses
        #[arg(short, long, value_delimiter = ',', required = true)]
        signers: Vec<String>,

        /// Signatures required to execute
        #[arg(short, long)]
        threshold: u8,

        /// Identifier of this vault, bound into every signing hash
        #[arg(short, long, default_value = "multisig-vault")]
        contract_id: String,
    },

    /// Credit the vault's balance
    Fund {
        #[arg(short, long)]
        amount: u128,

        /// Token address (native asset if omitted)
        #[arg(long)]
        token: Option<String>,
    },

    /// Propose a transfer
    Propose {
        /// Registered signer making the proposal
        #[arg(short, long)]
        proposer: String,

        #[arg(short, long)]
        recipient: String,

        #[arg(short, long)]
        amount: u128,

        /// Token address (native transfer if omitted)
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the digest a signer must sign
    Hash {
        #[arg(long)]
        txn_id: u64,

        /// Signer the digest is bound to
        #[arg(short, long)]
        caller: String,
    },

    /// Generate a signer key pair
    Keygen,

    /// Sign a digest with a private key
    Sign {
        #[arg(long)]
        hash: String,

        #[arg(short = 'k', long)]
        private_key: String,
    },

    /// Submit a recoverable signature
    Submit {
        #[arg(long)]
        txn_id: u64,

        #[arg(long)]
        hash: String,

        #[arg(short, long)]
        signature: String,
    },

    /// Show a transaction and its signatures
    Show {
        #[arg(long)]
        txn_id: u64,
    },

    /// Show vault status
    Status,

    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Contract id used when no vault exists yet
        #[arg(short, long, default_value = "multisig-vault")]
        contract_id: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need a stored vault
    match &cli.command {
        Commands::Init {
            signers,
            threshold,
            contract_id,
        } => return cli::cmd_init(&cli.data_dir, contract_id, signers, *threshold),
        Commands::Keygen => return cli::cmd_keygen(),
        Commands::Sign { hash, private_key } => return cli::cmd_sign(hash, private_key),
        Commands::Serve { port, contract_id } => {
            return run_server(&cli.data_dir, *port, contract_id)
        }
        _ => {}
    }

    let mut state = AppState::open(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. }
        | Commands::Keygen
        | Commands::Sign { .. }
        | Commands::Serve { .. } => unreachable!(),

        Commands::Fund { amount, token } => {
            cli::cmd_fund(&mut state, amount, token.as_deref())?;
        }

        Commands::Propose {
            proposer,
            recipient,
            amount,
            token,
        } => {
            cli::cmd_propose(&mut state, &proposer, &recipient, amount, token.as_deref())?;
        }

        Commands::Hash { txn_id, caller } => {
            cli::cmd_hash(&state, txn_id, &caller)?;
        }

        Commands::Submit {
            txn_id,
            hash,
            signature,
        } => {
            cli::cmd_submit(&mut state, txn_id, &hash, &signature)?;
        }

        Commands::Show { txn_id } => {
            cli::cmd_show(&state, txn_id)?;
        }

        Commands::Status => {
            cli::cmd_status(&state)?;
        }
    }

    Ok(())
}

fn run_server(
    data_dir: &Path,
    port: u16,
    contract_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        // Initialize storage
        let storage_config = StorageConfig {
            data_dir: data_dir.to_path_buf(),
            ..Default::default()
        };
        let storage = Arc::new(Storage::new(storage_config)?);

        // Load or create vault
        let (state, book) = if storage.exists() {
            println!("📂 Loading existing vault...");
            storage.load()?
        } else {
            println!("📂 Creating new vault...");
            let state = VaultState::new(Address::from(contract_id));
            let book = AssetBook::new();
            storage.save(&state, &book)?;
            (state, book)
        };
        let vault = Vault::from_state(state, book);

        let api_state = ApiState {
            vault: Arc::new(RwLock::new(vault)),
            storage,
        };
        let app = create_router(api_state);

        let addr = format!("0.0.0.0:{}", port);
        println!("🌐 REST API listening on http://{}", addr);
        println!("   GET  /api/vault");
        println!("   POST /api/transactions");
        println!("   POST /api/transactions/{{id}}/signatures");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    })
}
