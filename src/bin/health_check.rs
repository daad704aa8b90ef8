//! Standalone health check utility

use colored::*;

use engage_bot::config::load_env;
use engage_bot::utils::health_check::HealthCheckResult;
use engage_bot::utils::{log_health_check, perform_health_check};

fn print_header() {
    println!("\n{}", "━".repeat(60).cyan().bold());
    println!("{}", "     🏥 ENGAGEMENT BOT - HEALTH CHECK".cyan().bold());
    println!("{}\n", "━".repeat(60).cyan().bold());
}

fn print_recommendations(result: &HealthCheckResult) {
    if result.checks.gateway.status == "error" {
        println!("{}\n", "📋 Gateway issue:".red().bold());
        println!("   • Check GATEWAY_URL in your .env file");
        println!("   • Verify the gateway service is up and reachable");
        println!("   • Check your network connection\n");
    }

    if result.checks.ledger.status == "error" {
        println!("{}\n", "📋 Follow history issue:".red().bold());
        println!("   • The follow history file exists but cannot be parsed");
        println!("   • Restore it from a backup, or move it aside to start fresh");
        println!("   • The bot refuses to overwrite a corrupt history\n");
    }

    if result.checks.session_cache.status == "warning" {
        println!("{}\n", "⚠️  Session cache:".yellow().bold());
        println!("   • No cached session found; the next run signs in with the password");
        println!("   • This is normal on a first run\n");
    }
}

#[tokio::main]
async fn main() {
    print_header();

    let env = match load_env() {
        Ok(env) => env,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            std::process::exit(1);
        }
    };

    let result = perform_health_check(&env).await;
    log_health_check(&result);
    print_recommendations(&result);

    if result.healthy {
        println!("{}", "All checks passed. Ready to run.".green().bold());
    } else {
        println!("{}", "Some checks failed. See above.".red().bold());
        std::process::exit(1);
    }
}
