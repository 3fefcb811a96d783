//! 班级列表展示器
//!
//! 持有从后端拉取的班级列表，在本地完成搜索、筛选、排序与分页。
//! 展示器从不修改实体：所有写操作都经由客户端发出，随后整表重新拉取。

pub mod filter;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::client::ClassLifecycleClient;
use crate::config::ALLOWED_PAGE_SIZES;
use crate::errors::{DashboardError, Result};
use crate::lifecycle::available_actions;
use crate::models::classes::{
    entities::{ClassEntity, ClassState},
    requests::{ClassQueryParams, CreateClassRequest, DateBound, parse_date_bound},
    responses::{ClassListResponse, ClassView},
};
use crate::models::users::entities::Session;

pub use filter::{ClassFilter, SortKey, SortOrder, SortSpec, paginate};

pub struct ClassListPresenter {
    client: Arc<dyn ClassLifecycleClient>,
    session: Session,
    // 限定状态时通过 /classes/by-status 加载
    scope: Option<ClassState>,
    classes: Vec<ClassEntity>,
    filter: ClassFilter,
    sort: SortSpec,
    page: usize,
    page_size: usize,
}

impl ClassListPresenter {
    pub fn new(client: Arc<dyn ClassLifecycleClient>, session: Session, page_size: usize) -> Self {
        Self {
            client,
            session,
            scope: None,
            classes: Vec::new(),
            filter: ClassFilter::default(),
            sort: SortSpec::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// 仅展示某一状态的班级（例如管理员的待审批队列）
    pub fn scoped(
        client: Arc<dyn ClassLifecycleClient>,
        session: Session,
        page_size: usize,
        etat: ClassState,
    ) -> Self {
        Self {
            scope: Some(etat),
            ..Self::new(client, session, page_size)
        }
    }

    /// 从后端拉取列表；失败时保留上一次的数据
    pub async fn load(&mut self) -> Result<()> {
        let classes = match self.scope {
            Some(etat) => {
                self.client
                    .list_classes_by_status(&self.session, etat)
                    .await?
            }
            None => self.client.list_classes(&self.session).await?,
        };
        debug!(
            "Loaded {} classes for user {}",
            classes.len(),
            self.session.user_id
        );
        self.classes = classes;
        Ok(())
    }

    /// 写操作之后的整表刷新，数据来源与首次加载相同
    pub async fn reload(&mut self) -> Result<()> {
        self.load().await
    }

    /// 一次性应用 HTTP 查询参数
    pub fn apply_query(&mut self, query: &ClassQueryParams) -> Result<()> {
        let status = match query.etat.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                raw.to_ascii_uppercase()
                    .parse::<ClassState>()
                    .map_err(DashboardError::validation)?,
            ),
            _ => None,
        };
        let date_from = parse_date_bound(query.from.as_deref(), "from", DateBound::From)?;
        let date_to = parse_date_bound(query.to.as_deref(), "to", DateBound::To)?;
        if date_from.zip(date_to).is_some_and(|(from, to)| from > to) {
            return Err(DashboardError::validation(
                "'from' must not be later than 'to'",
            ));
        }

        let key = query
            .sort
            .as_deref()
            .map(str::parse::<SortKey>)
            .transpose()?
            .unwrap_or_default();
        let order = query
            .order
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?
            .unwrap_or_default();

        if let Some(size) = query.pagination.size {
            self.set_page_size(size)?;
        }
        self.set_search(query.search.clone().filter(|s| !s.trim().is_empty()));
        self.set_status(status);
        self.set_establishment(query.etablissement.clone().filter(|s| !s.trim().is_empty()));
        self.set_date_range(date_from, date_to);
        self.set_sort(SortSpec::new(key, order));
        self.set_page(query.pagination.page);
        Ok(())
    }

    // 以下筛选条件的修改都会把页码重置为 1

    pub fn set_search(&mut self, search: Option<String>) {
        self.filter.search = search;
        self.page = 1;
    }

    pub fn set_status(&mut self, status: Option<ClassState>) {
        self.filter.status = status;
        self.page = 1;
    }

    pub fn set_establishment(&mut self, etablissement_id: Option<String>) {
        self.filter.etablissement_id = etablissement_id;
        self.page = 1;
    }

    pub fn set_date_range(&mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) {
        self.filter.date_from = from;
        self.filter.date_to = to;
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if !ALLOWED_PAGE_SIZES.contains(&page_size) {
            return Err(DashboardError::validation(format!(
                "Page size must be one of {ALLOWED_PAGE_SIZES:?}, got {page_size}"
            )));
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(())
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn classes(&self) -> &[ClassEntity] {
        &self.classes
    }

    pub fn client(&self) -> &Arc<dyn ClassLifecycleClient> {
        &self.client
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn find(&self, class_id: &str) -> Option<&ClassEntity> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    /// 筛选并排序后的完整结果
    pub fn visible(&self) -> Vec<&ClassEntity> {
        let mut visible = self.filter.apply(&self.classes);
        self.sort.sort(&mut visible);
        visible
    }

    /// 附带当前用户可执行操作的班级视图
    pub fn view_of(&self, class: &ClassEntity) -> ClassView {
        ClassView {
            class: class.clone(),
            available_actions: available_actions(class, self.session.role),
        }
    }

    /// 当前页
    pub fn page_view(&self) -> ClassListResponse {
        let visible = self.visible();
        let (items, pagination) = paginate(&visible, self.page, self.page_size);
        ClassListResponse {
            pagination,
            items: items.iter().map(|class| self.view_of(class)).collect(),
        }
    }

    /// 提交新班级草稿，成功后刷新列表
    pub async fn create_class(&mut self, request: CreateClassRequest) -> Result<ClassEntity> {
        request.validate()?;
        let draft = request.into_draft(Utc::now());
        let created = self.client.create_class(&self.session, &draft).await?;
        info!(
            "User {} created class {} ({})",
            self.session.user_id, created.id, created.nom
        );
        self.reload().await?;
        Ok(created)
    }
}
