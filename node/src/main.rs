#![cfg_attr(not(feature = "simulator"), no_std)]
#![cfg_attr(not(feature = "simulator"), no_main)]

#[cfg(feature = "simulator")]
fn main() {
    // 模拟器入口
    use common::config::NodeConfig;
    use common::hal::simulator::{ModuleScript, SimBoard, SimClock};
    use node::NodeApp;
    use std::path::PathBuf;
    use tracing::{error, info};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 可选参数：JSON 配置文件路径
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = match NodeConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("配置加载失败: {}", e);
            std::process::exit(1);
        }
    };

    info!("启动电磁锁节点（模拟器模式）");

    let (board, handles) = SimBoard::new(SimClock::real());
    let script = ModuleScript {
        push: Some(("ON".to_string(), 45_000)),
        ..ModuleScript::default()
    };
    let _responder = handles.module.spawn_responder(script);

    NodeApp::new(board, config).run();
}

#[cfg(all(feature = "epy", not(feature = "simulator")))]
#[no_mangle]
pub extern "C" fn app_main() -> ! {
    // 开发板入口，由 SDK 启动代码调用
    use common::config::NodeConfig;
    use common::hal::epy::{EpyBoard, EpyClock};
    use common::hal::Clock;
    use node::NodeApp;
    use tracing::error;

    let config = NodeConfig::default();
    match EpyBoard::new(&config.link) {
        Ok(board) => NodeApp::new(board, config).run(),
        Err(e) => {
            error!("板卡初始化失败: {}", e);
            // 嵌入式设备不应该退出主循环
            let mut clock = EpyClock;
            loop {
                clock.delay_ms(1000);
            }
        }
    }
}

#[cfg(not(feature = "simulator"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}
