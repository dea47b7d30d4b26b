//! Console rendering for the interactive menu front end.

use crate::blockchain::{BalanceMap, Block};
use crate::keyring::truncate_key;
use crate::transaction::format_amount;
use colored::*;
use comfy_table::Table;
use std::io::{self, Write};

pub fn print_banner() {
    println!();
    println!("{}", "=====================================================".bright_cyan());
    println!("{}", "|        basechain - ledger transaction system      |".bright_cyan());
    println!("{}", "|---------------------------------------------------|".bright_cyan());
    println!("{}", "|  - SHA-256 hashed, proof-of-work sealed blocks    |".bright_cyan());
    println!("{}", "|  - secp256k1 signed value transfers               |".bright_cyan());
    println!("{}", "|  - multi-threaded mining                          |".bright_cyan());
    println!("{}", "=====================================================".bright_cyan());
    println!();
}

pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("=== {} ===", title).bright_blue().bold());
}

pub fn print_success(message: &str) {
    println!("{} {}", "[OK]".bright_green().bold(), message.bright_green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".bright_red().bold(), message.bright_red());
}

pub fn print_warning(message: &str) {
    println!("{} {}", "[WARNING]".bright_yellow().bold(), message.bright_yellow());
}

pub fn print_info(message: &str) {
    println!("{} {}", "[INFO]".bright_cyan().bold(), message);
}

pub fn print_menu(current_user: &str) {
    println!();
    println!("{}", "=".repeat(53));
    println!("{}", "Blockchain System Menu".bright_magenta().bold());
    print_info(&format!("Logged in as: {}", current_user.bright_yellow()));
    println!("{}", "-".repeat(53));
    println!("1. Register user");
    println!("2. Show list of users");
    println!("3. Select user");
    println!("4. Create transaction");
    println!("5. Show blockchain");
    println!("6. Save blockchain to file");
    println!("7. Validate blockchain");
    println!("8. Exit");
    println!("{}", "=".repeat(53));
}

/// Prints `label`, flushes, and reads one trimmed line from stdin.
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn print_block(block: &Block) {
    println!("+----------------------------------+");
    println!("|           BLOCK INFO             |");
    println!("+----------------------------------+");
    println!("| Index:      {}", block.index);
    println!("| Timestamp:  {}", block.timestamp);
    println!("| Difficulty: {}", block.difficulty);
    println!("| Nonce:      {}", block.nonce);
    println!("+----------------------------------+");
    println!("| Transactions:");
    for tx in &block.transactions {
        println!("|   - {}", tx);
    }
    println!("+----------------------------------+");
    println!("| Previous Hash:\n| {}", block.previous_hash);
    println!("| Hash:\n| {}", block.hash);
    println!("+----------------------------------+");
}

/// ASCII rendering of the chain as linked boxes.
pub fn draw_chain(chain: &[Block]) {
    print_info("Visualization of the chain:");

    let mut top = String::new();
    let mut middle = String::new();
    let mut bottom = String::new();

    for (i, block) in chain.iter().enumerate() {
        let label = format!("Block {}", block.index);
        let padding = 11usize.saturating_sub(label.len());
        let left = padding / 2;
        let right = padding - left;

        top.push_str("  +-----------+  ");
        middle.push_str(&format!(
            "  |{}{}{}|  ",
            " ".repeat(left),
            label,
            " ".repeat(right)
        ));
        bottom.push_str("  +-----------+  ");

        if i != chain.len() - 1 {
            top.push_str("     ");
            middle.push_str("---->");
            bottom.push_str("     ");
        }
    }

    println!("{}", top);
    println!("{}", middle);
    println!("{}", bottom);
    println!();
}

/// Tabulates registered users with their balances.
pub fn user_table(balances: &BalanceMap, current_user: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["User", "Balance", ""]);
    for (user, balance) in balances {
        let marker = if user == current_user { "<- active" } else { "" };
        table.add_row(vec![user.clone(), format_amount(*balance), marker.to_string()]);
    }
    table
}

/// Shortened hash for chatty console lines.
pub fn short_hash(hash: &str) -> String {
    truncate_key(hash)
}
