use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Questions {
    Table,
    Id,
    Content,
}

#[derive(Iden)]
enum Choices {
    Table,
    Id,
    Content,
}

#[derive(Iden)]
enum CorrectAnswers {
    Table,
    QuestionId,
    ChoiceId,
}

#[derive(Iden)]
enum BingoCards {
    Table,
    Id,
    Seed,
    Punch,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    BingoCardId,
    CreatedAt,
}

#[derive(Iden)]
enum UserAnswers {
    Table,
    UserId,
    QuestionId,
    ChoiceId,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // questions
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Questions::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Questions::Content).text().not_null())
                    .to_owned(),
            )
            .await?;

        // choices
        manager
            .create_table(
                Table::create()
                    .table(Choices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Choices::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Choices::Content).text().not_null())
                    .to_owned(),
            )
            .await?;

        // correct_answers
        manager
            .create_table(
                Table::create()
                    .table(CorrectAnswers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CorrectAnswers::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CorrectAnswers::ChoiceId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(CorrectAnswers::QuestionId)
                            .col(CorrectAnswers::ChoiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_correct_answers_question")
                            .from(CorrectAnswers::Table, CorrectAnswers::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_correct_answers_choice")
                            .from(CorrectAnswers::Table, CorrectAnswers::ChoiceId)
                            .to(Choices::Table, Choices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // bingo_cards
        manager
            .create_table(
                Table::create()
                    .table(BingoCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BingoCards::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(BingoCards::Seed).text().not_null())
                    .col(
                        ColumnDef::new(BingoCards::Punch)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .to_owned(),
            )
            .await?;

        // users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::BingoCardId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_bingo_card")
                            .from(Users::Table, Users::BingoCardId)
                            .to(BingoCards::Table, BingoCards::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_bingo_card_id")
                    .table(Users::Table)
                    .col(Users::BingoCardId)
                    .to_owned(),
            )
            .await?;

        // user_answers: one row per (user, question); resubmission overwrites
        manager
            .create_table(
                Table::create()
                    .table(UserAnswers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserAnswers::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserAnswers::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAnswers::ChoiceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAnswers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserAnswers::UserId)
                            .col(UserAnswers::QuestionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_answers_user")
                            .from(UserAnswers::Table, UserAnswers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_answers_question")
                            .from(UserAnswers::Table, UserAnswers::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_answers_choice")
                            .from(UserAnswers::Table, UserAnswers::ChoiceId)
                            .to(Choices::Table, Choices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_answers_question_id")
                    .table(UserAnswers::Table)
                    .col(UserAnswers::QuestionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAnswers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BingoCards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(CorrectAnswers::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Choices::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Questions::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
