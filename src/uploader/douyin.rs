//! 抖音发布器
//!
//! 通过浏览器自动化驱动抖音创作者中心的上传页面。
//! cookie 会话从账号文件加载，预检时验证登录态。

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::{Browser, Page};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{PublishError, PublishErrorKind};
use crate::models::PublishRequest;
use crate::uploader::{browser, PublishBackend};

/// 上传页面就绪/发布完成的轮询间隔与上限
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_POLLS: usize = 60;

/// 账号文件（Playwright storage state 格式，与原有 cookie 文件兼容）
#[derive(Debug, Deserialize)]
struct AccountState {
    #[serde(default)]
    cookies: Vec<StoredCookie>,
}

#[derive(Debug, Deserialize)]
struct StoredCookie {
    name: String,
    value: String,
    domain: String,
    #[serde(default = "default_cookie_path")]
    path: String,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

struct UploaderSession {
    _browser: Browser,
    page: Page,
}

/// 抖音发布后端
pub struct DouyinUploader {
    browser_debug_port: u16,
    account_file: String,
    upload_url: String,
    session: Mutex<Option<UploaderSession>>,
}

impl DouyinUploader {
    pub fn new(config: &Config) -> Self {
        Self {
            browser_debug_port: config.browser_debug_port,
            account_file: config.account_file.clone(),
            upload_url: config.upload_url.clone(),
            session: Mutex::new(None),
        }
    }

    fn load_account(&self) -> Result<AccountState, PublishError> {
        let text = std::fs::read_to_string(&self.account_file).map_err(|e| {
            PublishError::auth(format!(
                "无法读取账号文件 {}: {}",
                self.account_file, e
            ))
        })?;
        let state: AccountState = serde_json::from_str(&text)
            .map_err(|e| PublishError::auth(format!("账号文件解析失败: {}", e)))?;
        if state.cookies.is_empty() {
            return Err(PublishError::auth("账号文件中没有任何 cookie"));
        }
        Ok(state)
    }

    async fn apply_cookies(&self, page: &Page, state: &AccountState) -> Result<(), PublishError> {
        let mut params = Vec::with_capacity(state.cookies.len());
        for cookie in &state.cookies {
            let param = CookieParam::builder()
                .name(cookie.name.clone())
                .value(cookie.value.clone())
                .domain(cookie.domain.clone())
                .path(cookie.path.clone())
                .build()
                .map_err(PublishError::auth)?;
            params.push(param);
        }
        page.set_cookies(params)
            .await
            .map_err(|e| PublishError::browser(e.to_string()))?;
        Ok(())
    }

    /// 检查当前页面是否处于登录态（未被重定向到登录页）
    async fn is_logged_in(&self, page: &Page) -> Result<bool, PublishError> {
        let value = browser::eval(
            page,
            "!window.location.href.includes('login') && !document.querySelector('.login-scan')",
        )
        .await
        .map_err(|e| PublishError::browser(e.to_string()))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// 等待上传处理完成：标题输入框出现即表示视频已被页面接收
    async fn wait_for_upload_form(&self, page: &Page) -> Result<(), PublishError> {
        for _ in 0..MAX_POLLS {
            let ready = browser::eval(
                page,
                r#"!!document.querySelector('input[placeholder*="作品标题"], .semi-input')"#,
            )
            .await
            .map_err(|e| PublishError::browser(e.to_string()))?;
            if ready.as_bool().unwrap_or(false) {
                return Ok(());
            }
            sleep(POLL_INTERVAL).await;
        }
        Err(PublishError::media_rejected("等待上传表单超时，视频未被页面接收"))
    }

    /// 填写标题与话题标签
    async fn fill_form(&self, page: &Page, request: &PublishRequest) -> Result<(), PublishError> {
        let title_with_tags = if request.tags.is_empty() {
            request.title.clone()
        } else {
            let tags: Vec<String> = request.tags.iter().map(|t| format!("#{}", t)).collect();
            format!("{}\n{}", request.title, tags.join(" "))
        };
        let js = format!(
            r#"
            (() => {{
                const input = document.querySelector('input[placeholder*="作品标题"], .semi-input');
                if (!input) return false;
                const setter = Object.getOwnPropertyDescriptor(
                    window.HTMLInputElement.prototype, 'value').set;
                setter.call(input, {});
                input.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            serde_json::to_string(&title_with_tags)
                .map_err(|e| PublishError::browser(e.to_string()))?
        );
        let filled = browser::eval(page, js)
            .await
            .map_err(|e| PublishError::browser(e.to_string()))?;
        if !filled.as_bool().unwrap_or(false) {
            return Err(PublishError::platform("找不到标题输入框"));
        }
        Ok(())
    }

    /// 点击发布并等待跳转到作品管理页
    async fn submit(&self, page: &Page) -> Result<(), PublishError> {
        let clicked = browser::eval(
            page,
            r#"
            (() => {
                const buttons = [...document.querySelectorAll('button')];
                const publish = buttons.find(b => b.textContent.trim() === '发布');
                if (!publish || publish.disabled) return false;
                publish.click();
                return true;
            })()
            "#,
        )
        .await
        .map_err(|e| PublishError::browser(e.to_string()))?;
        if !clicked.as_bool().unwrap_or(false) {
            return Err(PublishError::platform("发布按钮不可用"));
        }

        for _ in 0..MAX_POLLS {
            let done = browser::eval(
                page,
                "window.location.href.includes('content/manage')",
            )
            .await
            .map_err(|e| PublishError::browser(e.to_string()))?;
            if done.as_bool().unwrap_or(false) {
                return Ok(());
            }
            sleep(POLL_INTERVAL).await;
        }
        Err(PublishError::platform("等待发布完成超时"))
    }
}

#[async_trait]
impl PublishBackend for DouyinUploader {
    async fn initialize(&self) -> Result<(), PublishError> {
        let account = self.load_account()?;

        let (browser_handle, page) = browser::connect_browser(self.browser_debug_port)
            .await
            .map_err(|e| PublishError::browser(e.to_string()))?;

        self.apply_cookies(&page, &account).await?;
        page.goto(self.upload_url.as_str())
            .await
            .map_err(|e| PublishError::network(e.to_string()))?;
        sleep(Duration::from_secs(2)).await;

        if !self.is_logged_in(&page).await? {
            return Err(PublishError::auth("cookie 已失效，请重新登录并导出账号文件"));
        }

        info!("✅ 抖音发布器初始化成功");
        *self.session.lock().await = Some(UploaderSession {
            _browser: browser_handle,
            page,
        });
        Ok(())
    }

    async fn publish(&self, request: &PublishRequest) -> Result<(), PublishError> {
        let session = self.session.lock().await;
        let session = session.as_ref().ok_or_else(|| {
            PublishError::new(PublishErrorKind::Browser, "发布器尚未初始化")
        })?;
        let page = &session.page;

        debug!("导航到上传页面: {}", self.upload_url);
        page.goto(self.upload_url.as_str())
            .await
            .map_err(|e| PublishError::network(e.to_string()))?;
        sleep(Duration::from_secs(2)).await;

        // 通过 CDP 向文件选择框注入媒体文件
        let input = page
            .find_element("input[type=file]")
            .await
            .map_err(|e| PublishError::browser(format!("找不到文件选择框: {}", e)))?;
        let params = SetFileInputFilesParams::builder()
            .file(request.media_path.clone())
            .backend_node_id(input.backend_node_id)
            .build()
            .map_err(PublishError::browser)?;
        page.execute(params)
            .await
            .map_err(|e| PublishError::media_rejected(format!("页面未接收媒体文件: {}", e)))?;

        self.wait_for_upload_form(page).await?;
        self.fill_form(page, request).await?;
        self.submit(page).await?;

        if request.scheduled_time.is_some() {
            warn!("定时发布尚未支持，已立即发布");
        }
        Ok(())
    }
}
