fn main() {
    // Host builds (tests, simulation) have no ESP-IDF toolchain to wire up.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
