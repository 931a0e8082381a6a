fn main() {
    // Build-time configuration override picked up by `RoverConfig::load`.
    println!("cargo:rerun-if-env-changed=ROVER_CONFIG_JSON");

    #[cfg(feature = "espidf")]
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
