fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");

    // 硬件目标需要专用链接脚本和裸机启动配置
    if std::env::var("CARGO_FEATURE_BEARPI").is_ok() {
        println!("cargo:rustc-link-arg=-Tbearpi_hi2821.ld");
        println!("cargo:rustc-link-arg=-nostartfiles");
    }
}
