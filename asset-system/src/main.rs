mod infrastructure;
mod server;
mod telemetry;

fn main() {
    server::run()
}
