use crate::config::ServeMode;
use crate::runtime::EvaluatorView;

/// Print a success message
pub fn print_success(title: &str, message: &str) {
    println!("\n\x1b[1;34m╭\x1b[0m");
    println!("  ✅ \x1b[1;36m{}\x1b[0m", title);
    println!();
    println!("  ✅ \x1b[1;32m{}\x1b[0m", message);
    println!("\x1b[1;34m╰\x1b[0m");
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("\n\x1b[1;34m╭\x1b[0m");
    println!("  ℹ️  \x1b[1;34m{}\x1b[0m", message);
    println!("\x1b[1;34m╰\x1b[0m");
}

/// Print a status message
pub fn print_status(message: &str) {
    println!("\n⏳ {}", message);
}

/// Print the startup box for `pyview serve`
pub fn print_server_info(
    url: &str,
    mode: ServeMode,
    engine: &str,
    views: usize,
    config_source: Option<&str>,
    watch: bool,
) {
    println!("\n\x1b[1;34m╭\x1b[0m");
    println!("  🐍 \x1b[1;36mpyview server\x1b[0m\n");
    println!("  🚀 \x1b[1;34mServer URL:\x1b[0m \x1b[4;36m{url}\x1b[0m");
    println!("  ⚙️  \x1b[1;34mMode:\x1b[0m \x1b[1;33m{mode}\x1b[0m");
    println!("  🔧 \x1b[1;34mEngine:\x1b[0m \x1b[0;37m{engine}\x1b[0m");
    println!("  🧩 \x1b[1;34mViews:\x1b[0m \x1b[1;32m{views}\x1b[0m");
    println!(
        "  📄 \x1b[1;34mConfig:\x1b[0m \x1b[0;37m{}\x1b[0m",
        config_source.unwrap_or("built-in defaults")
    );
    if watch {
        println!("  👀 \x1b[1;34mWatch Mode:\x1b[0m \x1b[1;32mEnabled\x1b[0m");
    }
    println!("\n  \x1b[0;37mPress Ctrl+C to stop the server\x1b[0m");
    println!("\x1b[1;34m╰\x1b[0m\n");
}

/// Print final view results for `pyview eval`
pub fn print_view_results(engine: &str, views: &[EvaluatorView]) {
    println!("\n\x1b[1;34m╭\x1b[0m");
    println!("  🐍 \x1b[1;36mpyview eval\x1b[0m \x1b[0;37m({engine})\x1b[0m\n");
    for view in views {
        println!("  \x1b[1;34m{}\x1b[0m", view.request().label());
        for line in view.render_line().lines() {
            println!("    {line}");
        }
    }
    println!("\x1b[1;34m╰\x1b[0m");
}

/// Print one check result line for `pyview check`
pub fn print_check(name: &str, passed: bool, detail: &str) {
    if passed {
        println!("  ✅ \x1b[1;34m{name}:\x1b[0m \x1b[0;37m{detail}\x1b[0m");
    } else {
        println!("  ❌ \x1b[1;34m{name}:\x1b[0m \x1b[1;31m{detail}\x1b[0m");
    }
}
