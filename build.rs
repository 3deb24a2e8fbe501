fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");

    // ePy 板卡固件使用厂商链接脚本，模拟器构建无需额外设置
    if std::env::var_os("CARGO_FEATURE_EPY").is_some() {
        println!("cargo:rustc-link-arg=-Tepy_m0.ld");
        println!("cargo:rustc-link-arg=-nostartfiles");
    }
}
