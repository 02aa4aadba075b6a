//! Injects Wi-Fi credentials from `.env` (or the environment) at build time.

const KEYS: [&str; 3] = ["WIFI_SSID", "WIFI_PASSWORD", "WIFI_HOSTNAME"];

fn main() {
    // A missing .env is fine, the variables may come from the shell instead
    let _ = dotenvy::dotenv();

    for key in KEYS {
        println!("cargo:rerun-if-env-changed={key}");
        let value = std::env::var(key).unwrap_or_else(|_| {
            println!("cargo:warning={key} is not set, using an empty value");
            String::new()
        });
        println!("cargo:rustc-env={key}={value}");
    }
    println!("cargo:rerun-if-changed=.env");
}
