//! VESSEL12 肺分割评估程序.
//!
//! 环境变量:
//!
//! 1. `$VESSEL12_DIR`: 数据集目录, 默认为 `$HOME/dataset/vessel12`;
//! 2. `$VESSEL12_OUT`: 若非空, 每个病例的预测掩膜 (`.npy`) 和中心切片对比图 (`.png`) 保存在该目录;
//! 3. `$RUST_LOG`: 日志等级, 默认为 `info`.

mod result;
mod runner;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .expect("Logger initialization error");

    runner::run().analyze();
}
