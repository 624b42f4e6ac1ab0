//! Statement accumulator shared by every chain state.

use crate::alias::TableKey;
use crate::entity::{EntityDescriptor, Field};
use crate::error::{FluentError, FluentResult};
use crate::executor::{BoundSql, ResultType};
use crate::ident::quote;
use crate::resolver;
use crate::query::Query;
use crate::segment::{BuildSession, Deferred, JoinKind, Parameterized, Segment, SegmentList};
use crate::select::SelectItem;
use crate::update::UpdateSet;

#[derive(Debug, Clone)]
enum TableSource {
    Entity(&'static EntityDescriptor),
    Named(String),
}

/// A table mentioned by the statement, with its optional explicit alias.
#[derive(Debug, Clone)]
pub(crate) struct TableRef {
    source: TableSource,
    alias: Option<String>,
}

impl TableRef {
    pub(crate) fn entity(descriptor: &'static EntityDescriptor, alias: Option<&str>) -> Self {
        Self {
            source: TableSource::Entity(descriptor),
            alias: alias.map(str::to_string),
        }
    }

    pub(crate) fn named(table: &str, alias: Option<&str>) -> Self {
        Self {
            source: TableSource::Named(table.to_string()),
            alias: alias.map(str::to_string),
        }
    }

    fn key(&self) -> TableKey {
        match &self.source {
            TableSource::Entity(d) => TableKey::from(*d),
            TableSource::Named(name) => match &self.alias {
                Some(alias) if !alias.is_empty() => TableKey::NamedAs {
                    table: name.clone(),
                    alias: alias.clone(),
                },
                _ => TableKey::Named(name.clone()),
            },
        }
    }

    fn has_explicit_alias(&self) -> bool {
        self.alias.as_deref().is_some_and(|a| !a.is_empty())
    }

    fn name(&self) -> FluentResult<String> {
        match &self.source {
            TableSource::Entity(d) => resolver::table_name(d),
            TableSource::Named(name) => Ok(name.clone()),
        }
    }

    /// Declare the table in the session. A table key may be declared once;
    /// a second instance of the same table needs its own alias, and a second
    /// instance of an entity needs [`TableRef::named`].
    fn register(&self, session: &mut BuildSession) -> FluentResult<()> {
        let name = self.name()?;
        let key = self.key();
        if session.aliases().has(&key) {
            return Err(FluentError::validation(format!(
                "table `{name}` is declared twice; give each instance its own alias"
            )));
        }
        session
            .aliases_mut()
            .add_table(key, &name, self.alias.as_deref());
        Ok(())
    }

    /// `` `table` `alias` ``
    pub(crate) fn render_declaration(&self, session: &mut BuildSession) -> FluentResult<String> {
        let name = self.name()?;
        let alias = session.aliases_mut().get(&self.key());
        Ok(format!("{} {}", quote(&name), quote(&alias)))
    }

    /// `` `table` ``
    pub(crate) fn render_name(&self) -> FluentResult<String> {
        Ok(quote(&self.name()?))
    }

    pub(crate) fn result_type(&self) -> ResultType {
        match &self.source {
            TableSource::Entity(d) => ResultType::Entity(d.type_path),
            TableSource::Named(_) => ResultType::Rows,
        }
    }
}

/// Alias registrations replayed at the start of every render.
#[derive(Debug, Clone)]
enum Registration {
    Table(TableRef),
    Column(Field, String),
}

/// UPDATE target and assignments collected before the SET list is closed.
#[derive(Debug, Clone)]
struct PendingUpdate {
    table: TableRef,
    set: UpdateSet,
}

/// Ordered segments plus everything needed to render them.
#[derive(Debug, Clone)]
pub(crate) struct StatementBuilder {
    segments: SegmentList,
    registrations: Vec<Registration>,
    selection: Vec<SelectItem>,
    pending: Option<PendingUpdate>,
    primary: ResultType,
    build_error: Option<String>,
}

impl StatementBuilder {
    pub(crate) fn new() -> Self {
        Self {
            segments: SegmentList::new(),
            registrations: Vec::new(),
            selection: Vec::new(),
            pending: None,
            primary: ResultType::Rows,
            build_error: None,
        }
    }

    pub(crate) fn concat(&mut self, segment: Segment) {
        self.segments.concat(segment);
    }

    pub(crate) fn concat_str(&mut self, text: &'static str) {
        self.segments.concat_str(text);
    }

    /// Record the first construction error; later ones are dropped.
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        if self.build_error.is_none() {
            self.build_error = Some(message.into());
        }
    }

    // ==================== SELECT ====================

    pub(crate) fn add_selection(&mut self, items: impl IntoIterator<Item = SelectItem>) {
        for item in items {
            if let SelectItem::Aliased(field, alias) = &item {
                self.registrations
                    .push(Registration::Column(*field, alias.clone()));
            }
            self.selection.push(item);
        }
    }

    /// `<selection> FROM <table>`; the table becomes the primary result type.
    pub(crate) fn from(&mut self, table: TableRef) {
        self.primary = table.result_type();
        let selection = std::mem::take(&mut self.selection);
        self.concat(Segment::Lazy(Deferred::Selection(selection)));
        self.concat_str("FROM");
        self.registrations.push(Registration::Table(table.clone()));
        self.concat(Segment::Lazy(Deferred::Table(table)));
    }

    pub(crate) fn join(&mut self, kind: JoinKind, table: TableRef) {
        self.registrations.push(Registration::Table(table.clone()));
        self.concat(Segment::Join(kind));
        self.concat(Segment::Lazy(Deferred::Table(table)));
    }

    /// `keyword <query>`, omitted entirely when the query is empty.
    pub(crate) fn clause(&mut self, keyword: &'static str, query: Query) {
        if query.is_empty() {
            return;
        }
        self.concat_str(keyword);
        self.concat(Segment::Query {
            query,
            grouped: false,
        });
    }

    pub(crate) fn limit(&mut self, n: i64) {
        match u64::try_from(n) {
            Ok(n) => self.concat(Segment::Lazy(Deferred::Limit(n))),
            Err(_) => self.fail(format!("LIMIT must not be negative, got {n}")),
        }
    }

    pub(crate) fn offset(&mut self, n: i64) {
        match u64::try_from(n) {
            Ok(n) => self.concat(Segment::Lazy(Deferred::Offset(n))),
            Err(_) => self.fail(format!("OFFSET must not be negative, got {n}")),
        }
    }

    // ==================== UPDATE ====================

    pub(crate) fn begin_update(&mut self, table: TableRef) {
        self.pending = Some(PendingUpdate {
            table,
            set: UpdateSet::new(),
        });
    }

    pub(crate) fn map_assignments(&mut self, f: impl FnOnce(UpdateSet) -> UpdateSet) {
        if let Some(PendingUpdate { table, set }) = self.pending.take() {
            self.pending = Some(PendingUpdate { table, set: f(set) });
        }
    }

    /// `UPDATE `table` SET a = ?, b = ?`. The target is not aliased.
    pub(crate) fn finish_update(&mut self) {
        let Some(PendingUpdate { table, set }) = self.pending.take() else {
            return;
        };
        if set.parameters().is_none() {
            self.fail("UPDATE requires at least one assignment");
        }
        self.concat_str("UPDATE");
        self.concat(Segment::Lazy(Deferred::TableName(table)));
        self.concat_str("SET");
        self.concat(Segment::Assignments(set));
    }

    // ==================== Rendering ====================

    /// Render in a fresh session. The session (and its aliases) is dropped
    /// before this returns, on success and on error alike.
    fn render_in(&self, mut session: BuildSession) -> FluentResult<BoundSql> {
        if let Some(message) = &self.build_error {
            return Err(FluentError::validation(message.clone()));
        }
        // explicit aliases first, so generated `tN` names never collide
        for explicit in [true, false] {
            for registration in &self.registrations {
                match registration {
                    Registration::Table(table) if table.has_explicit_alias() == explicit => {
                        table.register(&mut session)?;
                    }
                    Registration::Column(field, alias) if explicit => {
                        session.aliases_mut().add_column(*field, alias.clone());
                    }
                    _ => {}
                }
            }
        }
        let sql = self.segments.render(&mut session)?;
        let params = session.take_params();
        Ok(BoundSql::new(sql, params, self.primary))
    }

    pub(crate) fn build(&self) -> FluentResult<BoundSql> {
        self.render_in(BuildSession::new())
    }

    /// Same statement with `COUNT(1)` as the select list and no ORDER
    /// BY/LIMIT/OFFSET. A grouped statement is counted as a subquery, so the
    /// result is the number of groups.
    pub(crate) fn build_count(&self) -> FluentResult<BoundSql> {
        if !self.segments.has_group_by() {
            return self.render_in(BuildSession::counting());
        }
        let (sql, params) = self.render_in(BuildSession::unpaged())?.into_parts();
        Ok(BoundSql::new(
            format!("SELECT COUNT(1) FROM ({sql}) `counted`"),
            params,
            self.primary,
        ))
    }

    /// Same statement with its own LIMIT/OFFSET replaced by
    /// `LIMIT size OFFSET (page-1)*size`.
    pub(crate) fn build_paged(&self, size: u64, offset: u64) -> FluentResult<BoundSql> {
        let mut paged = self.clone();
        paged.segments.strip_paging();
        paged.concat(Segment::Lazy(Deferred::Limit(size)));
        paged.concat(Segment::Lazy(Deferred::Offset(offset)));
        paged.build()
    }
}
