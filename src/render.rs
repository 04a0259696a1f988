//! 页面渲染与静态资源
//!
//! Input: rust-embed 嵌入的 `assets/` 目录
//! Output: Tera 渲染后的 HTML、`/assets/*` 静态文件
//! Pos: 所有页面共用的视图层

use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    Router,
    body::Body,
    extract::Path,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

const TEMPLATE_PREFIX: &str = "templates/";
const STATIC_PREFIX: &str = "static/";

/// 模板渲染器
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// 从嵌入资源加载全部模板
    pub fn new() -> anyhow::Result<Self> {
        let mut templates = Vec::new();
        for path in Assets::iter() {
            let Some(name) = path.strip_prefix(TEMPLATE_PREFIX) else {
                continue;
            };
            let file = Assets::get(&path).with_context(|| format!("读取模板失败: {}", path))?;
            let content = String::from_utf8(file.data.into_owned())
                .with_context(|| format!("模板不是有效的 UTF-8: {}", path))?;
            templates.push((name.to_string(), content));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .context("解析模板失败")?;
        Ok(Self { tera })
    }

    pub fn shared() -> anyhow::Result<Arc<Self>> {
        Ok(Arc::new(Self::new()?))
    }

    /// 渲染模板为字符串
    pub fn render<T: Serialize>(&self, template: &str, view: &T) -> anyhow::Result<String> {
        let context = Context::from_serialize(view).context("序列化视图数据失败")?;
        self.tera
            .render(template, &context)
            .with_context(|| format!("渲染模板失败: {}", template))
    }

    /// 渲染为 HTML 响应，渲染失败时返回 500
    pub fn page<T: Serialize>(&self, status: StatusCode, template: &str, view: &T) -> Response {
        match self.render(template, view) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("{:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// 创建静态资源路由（挂载到 `/assets`）
pub fn create_assets_router() -> Router {
    Router::new().route("/{*path}", get(serve_asset))
}

async fn serve_asset(Path(path): Path<String>) -> Response {
    let key = format!("{}{}", STATIC_PREFIX, path.trim_start_matches('/'));
    match Assets::get(&key) {
        Some(file) => {
            let mime = mime_guess::from_path(&key).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .header(header::CACHE_CONTROL, "public, max-age=3600")
                .body(Body::from(file.data.into_owned()))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
