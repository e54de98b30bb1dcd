//! 浏览器连接 - 基础设施
//!
//! 连接到本机调试端口上的 Chrome 实例并创建页面。
//! 浏览器事件在后台任务中消费，断开即退出。

use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

/// 连接到调试端口上的浏览器并打开一个空白页面
pub async fn connect_browser(port: u16) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        e
    })?;

    Ok((browser, page))
}

/// 在页面上执行 JS 并返回 JSON 结果
pub async fn eval(page: &Page, js_code: impl Into<String>) -> Result<JsonValue> {
    let result = page.evaluate(js_code.into()).await?;
    let json_value = result.into_value()?;
    Ok(json_value)
}
