//! 电磁锁网状网络节点
//!
//! - [`common`]：硬件抽象、AT 指令行协议、链路适配器、配置
//! - [`node`]：按键采样、锁控状态机、绑定指示灯、主循环

#![cfg_attr(not(feature = "simulator"), no_std)]

pub use common;
pub use node;
