use std::sync::Arc;

use hyper::header::HeaderValue;
use hyper::Method;
use tokio_rustls::TlsConnector;
use tracing::{debug, info};

use super::Gateway;
use crate::auth::{AuthGate, BasicAuthVerifier, CredentialSource, CredentialVerifier};
use crate::error::GatewayError;
use crate::events::{ConsoleSink, EventBus, EventLogHandler, StreamSink, HTTP_REQUEST, HTTP_RESPONSE};
use crate::proxy::{ForwardHandler, ForwardRule, ForwardingEngine};
use crate::resources::{
    DirectoryProvider, MemoryProvider, ResourceChain, ResourceProvider, StaticHandler, TemplateMixer,
};
use crate::rewrite::{PathMatcher, RewriteRule, Rewriter};
use crate::routing::{HostPattern, PathTemplate, ReplacementPolicy, RouteHandler, RouteTable};
use crate::settings::{GatewaySettings, Settings, SettingsError};
use crate::tls;

/// 전달 훅 이벤트에 붙는 태그
const FORWARD_TAGS: [&str; 2] = ["Forward", "All"];

/// 게이트웨이를 조립합니다.
///
/// 라우트는 등록 순서대로 매칭됩니다. 내장 정적 라우트는 `build()`에서 가장 마지막에 추가되므로
/// 먼저 등록한 라우트가 `{prefix}/{*file}`에 가려지지 않습니다.
/// TLS 커넥터는 전달 라우트를 추가하기 전에 지정해야 합니다.
pub struct GatewayBuilder {
    settings: GatewaySettings,
    providers: Vec<Arc<dyn ResourceProvider>>,
    rewrite_rules: Vec<RewriteRule>,
    verifier: Option<Arc<dyn CredentialVerifier>>,
    engine: Arc<ForwardingEngine>,
    events: Arc<EventBus>,
    routes: RouteTable,
}

impl GatewayBuilder {
    pub fn new(settings: GatewaySettings) -> Self {
        let events = Arc::new(EventBus::new());
        events.register_event(HTTP_REQUEST, ["HTTP", "Request", "All"]);
        events.register_event(HTTP_RESPONSE, ["HTTP", "Response", "All"]);

        Self {
            settings,
            providers: Vec::new(),
            rewrite_rules: Vec::new(),
            verifier: None,
            engine: Arc::new(ForwardingEngine::new()),
            events,
            routes: RouteTable::new(),
        }
    }

    /// 설정 파일의 내용으로 빌더를 구성합니다.
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        let mut builder = Self::new(settings.gateway.clone());
        builder
            .events
            .attach_tagged("HTTP", Arc::new(ConsoleSink::new()));

        for dir in &settings.gateway.resources {
            let label = dir
                .label
                .clone()
                .unwrap_or_else(|| dir.path.display().to_string());
            builder = builder.with_provider(Arc::new(DirectoryProvider::new(label, dir.path.clone())));
        }

        if let Some(ca_path) = &settings.tls.client_ca_path {
            builder = builder.with_tls_connector(tls::client_connector(ca_path)?);
        }

        for rule in &settings.rewrite {
            let matcher = PathMatcher::from_str(&rule.path).map_err(|e| {
                SettingsError::InvalidConfig(format!("재작성 경로 '{}' 오류: {}", rule.path, e))
            })?;
            let mut rewrite = RewriteRule::new(matcher, rule.target.clone());
            if let Some(method) = &rule.method {
                rewrite = rewrite.with_method(parse_method(method)?);
            }
            if let Some(cookie) = &rule.cookie {
                rewrite = rewrite.with_cookie(cookie.clone());
            }
            builder = builder.with_rewrite(rewrite);
        }

        if let Some(auth) = &settings.auth {
            let source = match &auth.htpasswd {
                Some(path) => CredentialSource::Htpasswd(path.clone()),
                None => CredentialSource::Inline(auth.users.clone()),
            };
            builder = builder.with_verifier(Arc::new(BasicAuthVerifier::new(auth.realm.clone(), source)?));
        }

        for forwarding in &settings.forwarding {
            let rule = ForwardRule::new(
                PathTemplate::parse(&forwarding.path)?,
                &forwarding.target,
                forwarding.strip_prefix,
            )?
            .with_events(forwarding.request_event.clone(), forwarding.response_event.clone());

            let policy = if forwarding.replace {
                ReplacementPolicy::Allow
            } else {
                ReplacementPolicy::Fail
            };

            builder.add_forwarding_rule(&forwarding.hostname, parse_method(&forwarding.method)?, rule, policy)?;
        }

        Ok(builder)
    }

    /// 리소스 프로바이더를 추가합니다. 내장 프로바이더는 항상 마지막에 검색됩니다.
    pub fn with_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_rewrite(mut self, rule: RewriteRule) -> Self {
        self.rewrite_rules.push(rule);
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_tls_connector(mut self, connector: TlsConnector) -> Self {
        self.engine = Arc::new(ForwardingEngine::new().with_tls(connector));
        self
    }

    /// 빌드 전에 이벤트를 등록하거나 싱크를 부착할 때 사용합니다.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// 템플릿 경로로 들어온 요청을 `target`으로 전달하는 라우트를 등록합니다.
    pub fn add_forwarding(
        &mut self,
        hostname: &str,
        method: Method,
        template: &str,
        target: &str,
        strip_prefix: bool,
        policy: ReplacementPolicy,
    ) -> Result<(), GatewayError> {
        let rule = ForwardRule::new(PathTemplate::parse(template)?, target, strip_prefix)?;
        self.add_forwarding_rule(hostname, method, rule, policy)
    }

    pub fn add_forwarding_rule(
        &mut self,
        hostname: &str,
        method: Method,
        rule: ForwardRule,
        policy: ReplacementPolicy,
    ) -> Result<(), GatewayError> {
        for name in rule.request_event.iter().chain(rule.response_event.iter()) {
            self.events.register_event(name, FORWARD_TAGS);
        }

        let template = rule.template.clone();
        let handler = ForwardHandler::new(rule, self.engine.clone(), self.events.clone());
        self.routes.register(
            HostPattern::parse(hostname)?,
            method,
            template,
            Arc::new(handler),
            policy,
        )?;
        Ok(())
    }

    /// 임의의 핸들러를 라우트로 등록합니다.
    pub fn add_route(
        &mut self,
        hostname: &str,
        method: Method,
        template: &str,
        handler: Arc<dyn RouteHandler>,
        policy: ReplacementPolicy,
    ) -> Result<(), GatewayError> {
        self.routes.register(
            HostPattern::parse(hostname)?,
            method,
            PathTemplate::parse(template)?,
            handler,
            policy,
        )?;
        Ok(())
    }

    /// 템플릿 셸을 불러오고 내장 라우트를 추가한 뒤 변경할 수 없는 게이트웨이를 만듭니다.
    pub async fn build(mut self) -> Result<Gateway, GatewayError> {
        let prefix = self.settings.url_path_prefix.trim_end_matches('/').to_string();

        let mut chain = ResourceChain::new(self.providers);
        chain.push(Arc::new(MemoryProvider::builtin()));
        debug!(providers = ?chain.labels(), "리소스 체인 구성");

        let mixer = TemplateMixer::load(
            &chain,
            self.settings.template_path.as_deref(),
            &self.settings.template_slot,
        )
        .await?;

        let debug_stream = if self.settings.debug_log {
            let stream = Arc::new(StreamSink::new(self.settings.debug_log_capacity));
            self.events.attach_tagged("All", stream.clone());
            register_builtin(
                &mut self.routes,
                &format!("{}/DebugLog", prefix),
                Arc::new(EventLogHandler::new(stream.clone())),
            )?;
            Some(stream)
        } else {
            None
        };

        let static_handler: Arc<dyn RouteHandler> = Arc::new(StaticHandler::new(chain, Arc::new(mixer)));
        for path in ["/index.html", "/", "/{*file}"] {
            register_builtin(&mut self.routes, &format!("{}{}", prefix, path), static_handler.clone())?;
        }

        let mut rules = Vec::with_capacity(self.rewrite_rules.len() + 1);
        if self.settings.rewrite_index {
            rules.push(RewriteRule::index(&prefix));
        }
        rules.extend(self.rewrite_rules);

        let server_name = HeaderValue::from_str(&self.settings.name).map_err(|e| {
            SettingsError::InvalidConfig(format!("서버 이름 '{}' 오류: {}", self.settings.name, e))
        })?;

        info!(
            routes = self.routes.len(),
            rewrite_rules = rules.len(),
            auth = self.verifier.is_some(),
            "게이트웨이 구성 완료"
        );

        Ok(Gateway {
            routes: self.routes,
            rewriter: Rewriter::new(rules),
            auth: AuthGate::new(self.settings.public_prefix.clone()),
            verifier: self.verifier,
            events: self.events,
            server_name,
            debug_stream,
        })
    }
}

/// 같은 라우트가 이미 등록되어 있으면 건너뜁니다.
fn register_builtin(
    routes: &mut RouteTable,
    template: &str,
    handler: Arc<dyn RouteHandler>,
) -> Result<(), GatewayError> {
    let template = PathTemplate::parse(template)?;
    if routes.contains(&HostPattern::Any, &Method::GET, &template) {
        debug!(path = %template, "내장 라우트가 이미 등록되어 있어 건너뜀");
        return Ok(());
    }

    routes.register(HostPattern::Any, Method::GET, template, handler, ReplacementPolicy::Fail)?;
    Ok(())
}

fn parse_method(method: &str) -> Result<Method, GatewayError> {
    Method::from_bytes(method.as_bytes()).map_err(|e| {
        SettingsError::InvalidConfig(format!("HTTP 메서드 '{}' 오류: {}", method, e)).into()
    })
}
