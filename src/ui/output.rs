//! Output helpers shared by the inspection commands

use super::context::UiContext;
use console::{style, Style};

enum Step {
    Ok,
    Warn,
    Info,
}

fn step(ctx: &UiContext, kind: Step, text: &str) {
    if ctx.fancy() {
        let logged = match kind {
            Step::Ok => cliclack::log::success(text),
            Step::Warn => cliclack::log::warning(text),
            Step::Info => cliclack::log::info(text),
        };
        logged.ok();
        return;
    }

    let tag = match kind {
        Step::Ok => style("[OK]").green(),
        Step::Warn => style("[WARN]").yellow(),
        Step::Info => style("[INFO]").cyan(),
    };
    println!("  {} {}", tag, text);
}

/// Title line opening a report
pub fn heading(ctx: &UiContext, title: &str) {
    if ctx.fancy() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
        println!();
    }
}

pub fn success(ctx: &UiContext, message: &str, detail: &str) {
    let detail = if ctx.fancy() {
        style(detail).dim().to_string()
    } else {
        detail.to_string()
    };
    step(ctx, Step::Ok, &format!("{} ({})", message, detail));
}

pub fn warning(ctx: &UiContext, message: &str, hint: &str) {
    step(ctx, Step::Warn, &format!("{} - {}", message, hint));
}

pub fn note(ctx: &UiContext, message: &str) {
    step(ctx, Step::Info, message);
}

/// One `name: value` line of a report
pub fn field(ctx: &UiContext, name: &str, value: &str) {
    if ctx.fancy() {
        println!("  {}: {}", style(name).dim(), value);
    } else {
        println!("  {}: {}", name, value);
    }
}

/// A report field colored by whether it is healthy
pub fn field_status(ctx: &UiContext, name: &str, value: &str, ok: bool) {
    if ctx.fancy() {
        let value_style = if ok {
            Style::new().green()
        } else {
            Style::new().yellow()
        };
        println!("  {}: {}", style(name).dim(), value_style.apply_to(value));
    } else {
        let tag = if ok { "[OK]" } else { "[WARN]" };
        println!("  {} {}: {}", tag, name, value);
    }
}
