fn main() -> std::process::ExitCode {
    mister_freeze_lib::run()
}
