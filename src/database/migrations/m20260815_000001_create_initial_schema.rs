use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create projects table
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::OwnerId).string().not_null())
                    .col(ColumnDef::new(Projects::OrgId).string())
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_owner_id")
                    .table(Projects::Table)
                    .col(Projects::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Create datasets table
        manager
            .create_table(
                Table::create()
                    .table(Datasets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Datasets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Datasets::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Datasets::Name).string().not_null())
                    .col(
                        ColumnDef::new(Datasets::ObjectKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Datasets::Status)
                            .string()
                            .not_null()
                            .default("ready"),
                    )
                    .col(
                        ColumnDef::new(Datasets::Source)
                            .string()
                            .not_null()
                            .default("upload"),
                    )
                    .col(ColumnDef::new(Datasets::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_datasets_project_id")
                            .from(Datasets::Table, Datasets::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create tiingo_fetches table
        manager
            .create_table(
                Table::create()
                    .table(TiingoFetches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TiingoFetches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TiingoFetches::ProjectId).integer().not_null())
                    .col(ColumnDef::new(TiingoFetches::OwnerId).string().not_null())
                    .col(ColumnDef::new(TiingoFetches::DataType).string().not_null())
                    .col(ColumnDef::new(TiingoFetches::Symbol).string().not_null())
                    .col(ColumnDef::new(TiingoFetches::StartDate).string().not_null())
                    .col(ColumnDef::new(TiingoFetches::EndDate).string().not_null())
                    .col(ColumnDef::new(TiingoFetches::Frequency).string().not_null())
                    .col(
                        ColumnDef::new(TiingoFetches::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tiingo_fetches_project_id")
                            .from(TiingoFetches::Table, TiingoFetches::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create experiments table
        manager
            .create_table(
                Table::create()
                    .table(Experiments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Experiments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Experiments::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Experiments::DatasetId).integer())
                    .col(
                        ColumnDef::new(Experiments::WorkflowId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Experiments::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Experiments::ModelConfig).text().not_null())
                    .col(ColumnDef::new(Experiments::PerformanceMetrics).text())
                    .col(ColumnDef::new(Experiments::ModelArtifactKey).string())
                    .col(ColumnDef::new(Experiments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_experiments_project_id")
                            .from(Experiments::Table, Experiments::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_experiments_dataset_id")
                            .from(Experiments::Table, Experiments::DatasetId)
                            .to(Datasets::Table, Datasets::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create deployments table
        manager
            .create_table(
                Table::create()
                    .table(Deployments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deployments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Deployments::ExperimentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deployments::EndpointUrl).string())
                    .col(
                        ColumnDef::new(Deployments::Status)
                            .string()
                            .not_null()
                            .default("deploying"),
                    )
                    .col(ColumnDef::new(Deployments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deployments_experiment_id")
                            .from(Deployments::Table, Deployments::ExperimentId)
                            .to(Experiments::Table, Experiments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create workflow_outbox table
        manager
            .create_table(
                Table::create()
                    .table(WorkflowOutbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkflowOutbox::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkflowOutbox::WorkflowId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(WorkflowOutbox::WorkflowType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkflowOutbox::TaskQueue).string().not_null())
                    .col(ColumnDef::new(WorkflowOutbox::Payload).text().not_null())
                    .col(
                        ColumnDef::new(WorkflowOutbox::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(WorkflowOutbox::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(WorkflowOutbox::LastError).string())
                    .col(
                        ColumnDef::new(WorkflowOutbox::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkflowOutbox::DispatchedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workflow_outbox_status")
                    .table(WorkflowOutbox::Table)
                    .col(WorkflowOutbox::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkflowOutbox::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deployments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Experiments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TiingoFetches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Datasets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    OwnerId,
    OrgId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Datasets {
    Table,
    Id,
    ProjectId,
    Name,
    ObjectKey,
    Status,
    Source,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TiingoFetches {
    Table,
    Id,
    ProjectId,
    OwnerId,
    DataType,
    Symbol,
    StartDate,
    EndDate,
    Frequency,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Experiments {
    Table,
    Id,
    ProjectId,
    DatasetId,
    WorkflowId,
    Status,
    ModelConfig,
    PerformanceMetrics,
    ModelArtifactKey,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Deployments {
    Table,
    Id,
    ExperimentId,
    EndpointUrl,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum WorkflowOutbox {
    Table,
    Id,
    WorkflowId,
    WorkflowType,
    TaskQueue,
    Payload,
    Status,
    Attempts,
    LastError,
    CreatedAt,
    DispatchedAt,
}
