//! Web server command.

use console::style;

use crate::config::Settings;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>, port: u16) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind, port);

    println!(
        "{} Starting Snuggig OCR server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Data directory: {}", settings.data_dir.display());
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Nothing: "0.0.0.0:{default_port}"
/// - Just a port: "3030" -> 0.0.0.0:3030
/// - Just a host: "127.0.0.1" -> 127.0.0.1:{default_port}
/// - Host and port: "127.0.0.1:3030" -> 127.0.0.1:3030
fn parse_bind_address(bind: Option<&str>, default_port: u16) -> (String, u16) {
    let Some(bind) = bind else {
        return ("0.0.0.0".to_string(), default_port);
    };

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return ("0.0.0.0".to_string(), port);
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    // Must be just a host, use default port
    (bind.to_string(), default_port)
}
