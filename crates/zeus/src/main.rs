#![forbid(unsafe_code)]

#[tokio::main]
async fn main() {
    let code = zeus_cli::run(std::env::args_os()).await;
    std::process::exit(code);
}
