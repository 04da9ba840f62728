use anyhow::Result;
use homework_grader::utils::logging;
use homework_grader::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;

    if stats.failed > 0 || stats.cancelled > 0 {
        std::process::exit(1);
    }

    Ok(())
}
