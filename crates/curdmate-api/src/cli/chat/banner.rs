//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
///
/// Shows the record API being managed, whether free-text understanding is
/// available, and the session id.
pub fn print_welcome_banner(record_api: &str, nlp_model: Option<&str>, session_id: &str) {
    println!();
    println!("  * {}", style("CurdMate").cyan().bold());
    println!("  {}", style("Your contact assistant").dim());
    println!();
    println!("  {}  {}", style("Records:").bold(), style(record_api).dim());
    match nlp_model {
        Some(model) => println!("  {}    {}", style("Model:").bold(), style(model).dim()),
        None => println!(
            "  {}    {}",
            style("Model:").bold(),
            style("not configured (quick actions only)").yellow()
        ),
    }
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
