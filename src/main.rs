fn main() -> std::process::ExitCode {
    grove_lib::run()
}
