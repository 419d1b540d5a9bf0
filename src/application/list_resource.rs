//! Use case for loading one page of a resource list

use std::sync::Arc;

use super::catalog::ResourceCatalog;
use super::dto::ListResourceRequest;
use super::errors::ApplicationError;
use crate::analysis::PaginationPolicy;
use crate::infrastructure::api::{ElementsClient, SessionContext};
use crate::view::{ColumnPolicy, ListPage, ListQuery, ResourceView};

pub struct ListResourceUseCase {
    catalog: Arc<ResourceCatalog>,
    client: ElementsClient,
    pagination: PaginationPolicy,
    columns: ColumnPolicy,
    page_size: u64,
}

impl ListResourceUseCase {
    pub fn new(
        catalog: Arc<ResourceCatalog>,
        client: ElementsClient,
        pagination: PaginationPolicy,
        columns: ColumnPolicy,
        page_size: u64,
    ) -> Self {
        Self {
            catalog,
            client,
            pagination,
            columns,
            page_size,
        }
    }

    pub async fn execute(
        &self,
        request: ListResourceRequest,
        session: Option<&SessionContext>,
    ) -> Result<ListPage, ApplicationError> {
        let catalog = self.catalog.load().await?;
        let resource = catalog.resource(&request.resource)?;
        if resource.list.is_none() {
            return Err(ApplicationError::OperationNotFound {
                resource: request.resource,
                action: "list".to_string(),
            });
        }

        let view = ResourceView::new(resource, &self.pagination, &self.columns);
        let query = ListQuery {
            page: request.page,
            page_size: self.page_size,
            filters: request.filters,
        };
        Ok(view.load(&self.client, session, &query).await?)
    }
}
