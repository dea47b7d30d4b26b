#![forbid(unsafe_code)]

use basechain::address::is_valid_address;
use basechain::blockchain::{Blockchain, GENESIS_USER};
use basechain::cli;
use basechain::config::{load_config, Config};
use basechain::crypto::derive_archive_key;
use basechain::error::ChainError;
use basechain::keyring::{load_key_file, save_key_file, truncate_key, KeyRegistry};
use basechain::persistence;
use basechain::transaction::{format_amount, Amount, Transaction};
use std::path::Path;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    cli::print_banner();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            cli::print_error(&e.to_string());
            return;
        }
    };

    let mut registry = KeyRegistry::new();
    let mut current_user = GENESIS_USER.to_string();

    cli::print_section("System Initialization");
    cli::print_info(&format!("Logged in as: {}", current_user));
    if let Err(e) = provision_keys(&mut registry, &config, GENESIS_USER) {
        cli::print_error(&format!("Key provisioning failed: {}", e));
        return;
    }

    cli::print_section("Genesis Block Creation");
    cli::print_info("Mining genesis block...");
    let ledger = Blockchain::with_difficulty(config.mining.difficulty);
    cli::print_success("Genesis block created successfully!");

    loop {
        cli::print_menu(&current_user);
        let choice = match cli::prompt("Choose an action: ") {
            Ok(line) => line,
            Err(_) => break,
        };

        match choice.as_str() {
            "1" => register_user(&ledger, &mut registry, &config),
            "2" => list_users(&ledger, &registry, &current_user),
            "3" => select_user(&ledger, &registry, &mut current_user),
            "4" => create_transaction(&ledger, &registry, &config, &current_user),
            "5" => show_blockchain(&ledger),
            "6" => save_blockchain(&ledger, &config),
            "7" => validate_blockchain(&ledger, &registry),
            "8" => {
                cli::print_section("System Shutdown");
                cli::print_info("Thank you for using basechain!");
                break;
            }
            _ => cli::print_error("Invalid menu option"),
        }
    }
}

/// Generates a keypair for `user`, registers the public half, and writes the
/// key file.
fn provision_keys(
    registry: &mut KeyRegistry,
    config: &Config,
    user: &str,
) -> Result<(), ChainError> {
    let keypair = registry.generate(user)?;
    let path = save_key_file(Path::new(&config.storage.keys_dir), user, &keypair)?;
    cli::print_warning(&format!("Key file saved to: {}", path.display()));
    cli::print_info(&format!(
        "Public key (truncated): {}",
        truncate_key(&hex::encode(keypair.public_key_bytes()))
    ));
    Ok(())
}

fn register_user(ledger: &Blockchain, registry: &mut KeyRegistry, config: &Config) {
    cli::print_section("User Registration");
    let name = match cli::prompt("Enter new username: ") {
        Ok(name) => name,
        Err(_) => return,
    };

    if !is_valid_address(&name) {
        cli::print_error(
            "Invalid username format. Use alphanumeric characters and underscores (3-20 chars)",
        );
        return;
    }

    if let Err(e) = ledger.register_user(&name) {
        cli::print_error(&format!("Registration failed: {}", e));
        return;
    }
    if let Err(e) = provision_keys(registry, config, &name) {
        cli::print_error(&format!("Registration failed: {}", e));
        return;
    }
    cli::print_success(&format!("User '{}' registered successfully", name));
}

fn list_users(ledger: &Blockchain, registry: &KeyRegistry, current_user: &str) {
    cli::print_section("Registered Users");
    if registry.user_count() == 0 {
        cli::print_warning("No users registered yet");
        return;
    }
    println!("{}", cli::user_table(&ledger.balances(), current_user));
}

fn select_user(ledger: &Blockchain, registry: &KeyRegistry, current_user: &mut String) {
    cli::print_section("User Login");
    let name = match cli::prompt("Enter username: ") {
        Ok(name) => name,
        Err(_) => return,
    };

    if registry.contains(&name) {
        *current_user = name;
        cli::print_success(&format!("Logged in as: {}", current_user));
        cli::print_info(&format!(
            "Current balance: {}",
            format_amount(ledger.balance_of(current_user))
        ));
    } else {
        cli::print_error(&format!("User '{}' not found", name));
    }
}

fn create_transaction(
    ledger: &Blockchain,
    registry: &KeyRegistry,
    config: &Config,
    current_user: &str,
) {
    cli::print_section("New Transaction");

    let receiver = match cli::prompt("Recipient's username: ") {
        Ok(receiver) => receiver,
        Err(_) => return,
    };
    if receiver.is_empty() {
        cli::print_error("Recipient cannot be empty");
        return;
    }

    let amount_input = match cli::prompt("Amount to send: ") {
        Ok(input) => input,
        Err(_) => return,
    };
    let amount: Amount = match amount_input.parse() {
        Ok(amount) => amount,
        Err(_) => {
            cli::print_error("Invalid amount format");
            return;
        }
    };

    let balance = ledger.balance_of(current_user);
    if amount > balance {
        cli::print_error(&format!(
            "Insufficient funds. Available: {}",
            format_amount(balance)
        ));
        return;
    }

    let metadata = match cli::prompt("Metadata (optional): ") {
        Ok(metadata) => metadata,
        Err(_) => return,
    };

    let keypair = match load_key_file(Path::new(&config.storage.keys_dir), current_user) {
        Ok(keypair) => keypair,
        Err(e) => {
            cli::print_error(&format!("Failed to load signing key: {}", e));
            return;
        }
    };

    cli::print_section("Processing Transaction");
    let mut tx = Transaction::new(current_user, &receiver, amount, &metadata);
    if let Err(e) = tx.sign(&keypair) {
        cli::print_error(&format!("Transaction failed: {}", e));
        return;
    }

    cli::print_info("Transaction details:");
    println!(" - Sender:   {}", tx.sender);
    println!(" - Receiver: {}", tx.receiver);
    println!(" - Amount:   {}", format_amount(tx.amount));
    println!(" - TX ID:    {}", cli::short_hash(&tx.tx_id));

    match ledger.add_block(vec![tx], registry) {
        Ok(()) => cli::print_success("Transaction successfully added to the blockchain!"),
        Err(e) => cli::print_error(&format!("Transaction failed: {}", e)),
    }
}

fn show_blockchain(ledger: &Blockchain) {
    let chain = ledger.chain_snapshot();
    for block in &chain {
        cli::print_block(block);
    }
    cli::draw_chain(&chain);
}

fn save_blockchain(ledger: &Blockchain, config: &Config) {
    cli::print_section("Blockchain Backup");
    let passphrase = match cli::prompt("Encryption passphrase: ") {
        Ok(passphrase) => passphrase,
        Err(_) => return,
    };
    if passphrase.is_empty() {
        cli::print_error("Passphrase cannot be empty");
        return;
    }

    let key = derive_archive_key(&passphrase);
    let chain = ledger.chain_snapshot();
    match persistence::save_archive(Path::new(&config.storage.archive_path), &chain, &key) {
        Ok(()) => {
            cli::print_success(&format!("Blockchain saved to {}", config.storage.archive_path));
            cli::print_warning("Keep the encryption passphrase safe; the archive is unreadable without it.");
        }
        Err(e) => cli::print_error(&format!("Backup failed: {}", e)),
    }
}

fn validate_blockchain(ledger: &Blockchain, registry: &KeyRegistry) {
    cli::print_section("Blockchain Validation");
    cli::print_info(&format!(
        "Blocks: {} | Transactions: {}",
        ledger.block_count(),
        ledger.transaction_count()
    ));
    if ledger.is_chain_valid(registry) {
        cli::print_success("Blockchain integrity verified!");
    } else {
        cli::print_error("Blockchain validation failed!");
    }
}
