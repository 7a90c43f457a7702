//! vcseal CLI - inscribe Verifiable Credentials on-chain and verify them.

use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use vcseal::ledger::memory::MemoryLedger;
use vcseal::ledger::{BitcoindRpc, Network, RpcConfig, StaticSigner};
use vcseal::{
    EnvelopeCodec, Inscriber, InscriberConfig, InscriptionId, VerifiableCredential,
    DEFAULT_COMMIT_AMOUNT_SATS,
};

#[derive(Parser)]
#[command(name = "vcseal")]
#[command(about = "Inscribe Verifiable Credentials into ledger null-data outputs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Node connection and wallet options, shared by the on-chain commands.
#[derive(Args)]
struct NodeOpts {
    /// Node RPC endpoint
    #[arg(long, env = "VCSEAL_RPC_URL", default_value = "http://127.0.0.1:18443")]
    rpc_url: String,
    /// RPC username
    #[arg(long, env = "VCSEAL_RPC_USER")]
    rpc_user: String,
    /// RPC password
    #[arg(long, env = "VCSEAL_RPC_PASS")]
    rpc_pass: String,
    /// Wallet name for wallet-scoped RPC calls
    #[arg(long, env = "VCSEAL_WALLET")]
    wallet: Option<String>,
    /// Network the receiving address belongs to
    #[arg(long, env = "VCSEAL_NETWORK", default_value = "regtest")]
    network: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a credential and publish it via commit and reveal
    Inscribe {
        #[command(flatten)]
        node: NodeOpts,
        /// Receiving address for the commit output
        #[arg(long, env = "VCSEAL_ADDRESS")]
        address: String,
        /// Amount locked by the commit transaction, in satoshis
        #[arg(long, default_value_t = DEFAULT_COMMIT_AMOUNT_SATS)]
        commit_amount: u64,
        /// Credential JSON file (the bundled sample if not provided)
        #[arg(long)]
        file: Option<String>,
    },
    /// Fetch an inscription and verify its envelope and credential
    Verify {
        #[command(flatten)]
        node: NodeOpts,
        /// The reveal transaction id
        inscription_id: String,
    },
    /// Encode a credential to its envelope without touching a node
    Encode {
        /// Credential JSON file (or stdin if not provided)
        input: Option<String>,
        /// Emit base64 instead of hex
        #[arg(long)]
        base64: bool,
    },
    /// Run the full inscribe/verify cycle against an in-process ledger
    Test,
}

fn read_credential(path: Option<&str>) -> anyhow::Result<VerifiableCredential> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading credential file {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading credential from stdin")?;
            buf
        }
    };
    let vc = VerifiableCredential::from_json_str(&raw).context("parsing credential JSON")?;
    if !vc.is_complete() {
        bail!("credential is missing required fields: {}", vc.missing_fields().join(", "));
    }
    Ok(vc)
}

fn rpc_client(node: &NodeOpts) -> anyhow::Result<Arc<BitcoindRpc>> {
    let mut config = RpcConfig::new(&node.rpc_url, &node.rpc_user, &node.rpc_pass);
    if let Some(wallet) = &node.wallet {
        config = config.with_wallet(wallet);
    }
    Ok(Arc::new(BitcoindRpc::new(config).context("building RPC client")?))
}

async fn inscribe(
    node: NodeOpts,
    address: String,
    commit_amount: u64,
    file: Option<String>,
) -> anyhow::Result<()> {
    let vc = match file.as_deref() {
        Some(path) => read_credential(Some(path))?,
        None => VerifiableCredential::from_json_str(SAMPLE_VC)?,
    };
    let ledger = rpc_client(&node)?;
    let signer = StaticSigner::new(Network::parse(&node.network)?, address)?;

    let config = InscriberConfig {
        commit_amount_sats: commit_amount,
        ..InscriberConfig::default()
    };
    let inscriber = Inscriber::new(ledger, signer, config);

    let record = inscriber.inscribe(&vc).await?;
    println!("inscription id: {}", record.inscription_id);
    println!("credential hash: {}", record.hash_hex);
    Ok(())
}

async fn verify(node: NodeOpts, inscription_id: String) -> anyhow::Result<()> {
    let ledger = rpc_client(&node)?;
    let verifier = vcseal::RetrievalVerifier::new(ledger, EnvelopeCodec::default());

    let result = verifier.verify(&InscriptionId::from_str_id(inscription_id)).await?;
    println!("verified: hash {} (schema v{})", result.hash_hex, result.version);
    println!("{}", serde_json::to_string_pretty(&result.vc.to_value())?);
    Ok(())
}

fn encode(input: Option<String>, base64: bool) -> anyhow::Result<()> {
    let vc = read_credential(input.as_deref())?;
    let payload = EnvelopeCodec::default().encode(&vc)?;
    if base64 {
        println!("{}", payload.to_base64());
    } else {
        println!("{}", payload.to_hex());
    }
    Ok(())
}

const SAMPLE_VC: &str = r#"{
    "@context": ["https://www.w3.org/2018/credentials/v1"],
    "type": ["VerifiableCredential"],
    "issuer": "did:example:123",
    "credentialSubject": {"id": "did:example:456"}
}"#;

const SAMPLE_ADDRESS: &str = "bcrt1qsample000000000000000000000000000000000";

async fn test_cycle() -> anyhow::Result<()> {
    let vc = VerifiableCredential::from_json_str(SAMPLE_VC)?;
    let ledger = Arc::new(MemoryLedger::new());
    let signer = StaticSigner::new(Network::Regtest, SAMPLE_ADDRESS)?;
    let inscriber = Inscriber::new(Arc::clone(&ledger), signer, InscriberConfig::default());

    let record = inscriber.inscribe(&vc).await?;
    println!("inscribed: {}", record.inscription_id);

    let result = inscriber.verify(&record.inscription_id).await?;
    if result.vc != vc {
        bail!("round-trip mismatch");
    }
    println!("verified: hash {}", result.hash_hex);
    println!("{}", serde_json::to_string_pretty(&result.vc.to_value())?);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inscribe {
            node,
            address,
            commit_amount,
            file,
        } => inscribe(node, address, commit_amount, file).await,
        Commands::Verify {
            node,
            inscription_id,
        } => verify(node, inscription_id).await,
        Commands::Encode { input, base64 } => encode(input, base64),
        Commands::Test => test_cycle().await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
