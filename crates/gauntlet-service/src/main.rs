//! Command-line entry point for the Gauntlet receiver.
//!
//! Signs, decodes and verifies 93-byte auction messages, and can run a
//! message through the full receiver path against in-memory custody.

use alloy_primitives::{Address, U256};
use clap::{Parser, Subcommand};
use gauntlet_config::Config;
use gauntlet_types::{current_timestamp, InboundDelivery};
use std::path::{Path, PathBuf};

mod factory_registry;

use factory_registry::build_gauntlet_from_config;

/// Command-line arguments for the receiver.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Sign an auction with the configured account and print the message
	Sign {
		#[arg(long)]
		auction_id: u32,
		/// UNIX timestamp at which anyone may trigger the fill
		#[arg(long)]
		expiry: u32,
		#[arg(long)]
		recipient: Address,
	},
	/// Decode a hex message into its fields
	Decode {
		message: String,
	},
	/// Check a message against the receiver without paying out
	Verify {
		message: String,
		/// Relayer the bridge reports as the filler
		#[arg(long)]
		signer: Address,
		/// Account triggering the payout
		#[arg(long)]
		caller: Address,
		/// Override the current UNIX time
		#[arg(long)]
		now: Option<u32>,
	},
	/// Run a message through the receiver against in-memory custody
	Fill {
		message: String,
		#[arg(long)]
		token: Address,
		#[arg(long)]
		amount: U256,
		/// Relayer the bridge reports as the filler
		#[arg(long)]
		signer: Address,
		/// Account triggering the payout
		#[arg(long)]
		caller: Address,
		/// Bridge endpoint delivering the message; defaults to the trusted one
		#[arg(long)]
		endpoint: Option<Address>,
		/// Amount credited to the receiver first; defaults to `amount`
		#[arg(long)]
		deposit: Option<U256>,
		/// Whether the bridge reports the fill as complete
		#[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
		fill_completed: bool,
		/// Override the current UNIX time
		#[arg(long)]
		now: Option<u32>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// Logs go to stderr so command output stays machine readable
	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let output = execute(args.command, &args.config).await?;
	println!("{}", output);
	Ok(())
}

/// Runs a subcommand and returns what it prints.
async fn execute(command: Command, config_path: &Path) -> Result<String, Box<dyn std::error::Error>> {
	match command {
		Command::Decode { message } => {
			let message = gauntlet_codec::decode_hex(&message)?;
			Ok(serde_json::to_string_pretty(&message)?)
		},
		Command::Sign {
			auction_id,
			expiry,
			recipient,
		} => {
			let gauntlet = build_gauntlet_from_config(load_config(config_path).await?).await?;
			let message = gauntlet.sign_message(auction_id, expiry, recipient).await?;
			Ok(alloy_primitives::hex::encode_prefixed(&message))
		},
		Command::Verify {
			message,
			signer,
			caller,
			now,
		} => {
			let gauntlet = build_gauntlet_from_config(load_config(config_path).await?).await?;
			let message = gauntlet_codec::decode_hex(&message)?;
			let now = now.unwrap_or_else(current_timestamp);
			let authorization = gauntlet.verify(&message, caller, signer, now)?;
			Ok(serde_json::to_string_pretty(&authorization)?)
		},
		Command::Fill {
			message,
			token,
			amount,
			signer,
			caller,
			endpoint,
			deposit,
			fill_completed,
			now,
		} => {
			let config = load_config(config_path).await?;
			let endpoint = endpoint
				.or(config.receiver.endpoint)
				.unwrap_or(Address::ZERO);
			let gauntlet = build_gauntlet_from_config(config).await?;

			gauntlet
				.deposit(token, deposit.unwrap_or(amount))
				.await?;

			let delivery = InboundDelivery {
				endpoint,
				token,
				amount,
				fill_completed,
				designated_signer: signer,
				message: alloy_primitives::hex::decode(&message)?.into(),
			};
			let now = now.unwrap_or_else(current_timestamp);
			let receipt = gauntlet.handle_message(&delivery, caller, now).await?;
			Ok(serde_json::to_string_pretty(&receipt)?)
		},
	}
}

async fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
	let config = Config::from_file(path).await?;
	tracing::info!(
		path = %path.display(),
		chain_id = config.receiver.chain_id,
		"Loaded configuration"
	);
	Ok(config)
}
