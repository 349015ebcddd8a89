#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quill_core::{
        ColumnKind, CompiledStatement, Config, GenericDialect, Method, Raw, SchemaBuilder,
        TableBuilder, TableMethod, Value, count_placeholders,
    };
    use std::time::Duration;

    fn sql(statements: &[CompiledStatement]) -> Vec<&str> {
        statements.iter().map(|v| v.sql.as_str()).collect()
    }

    #[test]
    fn create_table() {
        let statements = SchemaBuilder::new()
            .create_table("users", |t| {
                t.increments("id");
                t.string("email", None).not_nullable().unique();
                t.integer("age").nullable().default_to(18);
                t.enu("role", ["admin", "user"]).default_to("user");
                t.decimal("balance", 8, 2);
                t.timestamps(true);
            })
            .compile(&GenericDialect)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            [
                indoc! {r#"
                    create table "users" (
                    "id" integer not null primary key autoincrement,
                    "email" varchar(255) not null,
                    "age" integer null default 18,
                    "role" text check ("role" in ('admin', 'user')) default 'user',
                    "balance" decimal(8, 2),
                    "created_at" datetime not null default CURRENT_TIMESTAMP,
                    "updated_at" datetime not null default CURRENT_TIMESTAMP)
                "#}
                .trim()
                .replace("(\n", "(")
                .replace(",\n", ", ")
                .replace("\n", " ")
                .as_str(),
                r#"create unique index "users_email_unique" on "users" ("email")"#,
            ]
        );
        assert!(statements.iter().all(|v| v.method == Method::Ddl));
    }

    #[test]
    fn create_table_with_keys() {
        let statements = SchemaBuilder::new()
            .create_table_if_not_exists("posts", |t| {
                t.increments("id").primary();
                t.integer("user_id")
                    .references("users.id")
                    .on_delete("cascade");
                t.integer("author_id");
                t.foreign(["author_id"])
                    .references(["users.id"])
                    .with_key_name("fk_author");
                t.index(["user_id", "author_id"], None);
            })
            .compile(&GenericDialect)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            [
                r#"create table if not exists "posts" ("id" integer not null primary key autoincrement, "user_id" integer, "author_id" integer)"#,
                r#"alter table "posts" add constraint "fk_author" foreign key ("author_id") references "users" ("id")"#,
                r#"create index "posts_user_id_author_id_index" on "posts" ("user_id", "author_id")"#,
                r#"alter table "posts" add constraint "posts_user_id_foreign" foreign key ("user_id") references "users" ("id") on delete cascade"#,
            ]
        );
    }

    #[test]
    fn alter_table() {
        let statements = SchemaBuilder::new()
            .alter_table("users", |t| {
                t.string("nick", Some(40)).nullable();
                t.rename_column("name", "full_name");
                t.drop_columns(["a", "b"]);
                t.drop_index(["email"], None);
                t.drop_primary(None);
                t.comment("Skipped by the generic dialect");
            })
            .compile(&GenericDialect)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            [
                r#"alter table "users" add column "nick" varchar(40) null"#,
                r#"alter table "users" rename column "name" to "full_name""#,
                r#"alter table "users" drop column "a", drop column "b""#,
                r#"drop index "users_email_index""#,
                r#"alter table "users" drop constraint "users_pkey""#,
            ]
        );
    }

    #[test]
    fn alter_column_only_when_altering() {
        let mut table = TableBuilder::new("t", TableMethod::Create);
        table.integer("a").alter();
        assert_eq!(table.columns()[0].kind, ColumnKind::Add);

        let mut table = TableBuilder::new("t", TableMethod::Alter);
        table.integer("a").alter();
        assert_eq!(table.columns()[0].kind, ColumnKind::Alter);

        let statements = SchemaBuilder::new()
            .table("t", |t| {
                t.integer("a").alter();
            })
            .compile(&GenericDialect)
            .expect("Could not compile the schema");
        assert!(statements.is_empty());
    }

    #[test]
    fn schema_statements() {
        let statements = SchemaBuilder::new()
            .drop_table_if_exists("a")
            .drop_table("b")
            .rename_table("a", "b")
            .has_table("users")
            .has_column("users", "id")
            .create_schema("s", true)
            .drop_schema("s", false)
            .raw(Raw::new("vacuum ??").bind("users"))
            .compile(&GenericDialect)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            [
                r#"drop table if exists "a""#,
                r#"drop table "b""#,
                r#"alter table "a" rename to "b""#,
                "select * from information_schema.tables where table_name = ?",
                "select * from information_schema.columns where table_name = ? and column_name = ?",
                r#"create schema if not exists "s""#,
                r#"drop schema "s""#,
                r#"vacuum "users""#,
            ]
        );
        assert_eq!(statements[3].method, Method::HasTable);
        assert_eq!(statements[3].bindings, [Value::Text("users".into())]);
        assert_eq!(statements[4].method, Method::HasColumn);
        assert_eq!(statements[4].bindings.len(), 2);
        assert_eq!(statements[7].method, Method::Raw);
    }

    #[test]
    fn config_applies_to_schema() {
        let config = Config::new()
            .identifier_transform(|v| v.to_uppercase())
            .default_timeout(Duration::from_secs(1));
        let statements = SchemaBuilder::new()
            .create_table("users", |t| {
                t.integer("id");
            })
            .compile_with(&GenericDialect, &config)
            .expect("Could not compile the schema");
        assert_eq!(sql(&statements), [r#"create table "USERS" ("ID" integer)"#]);
        assert_eq!(statements[0].timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn column_errors() {
        let error = SchemaBuilder::new()
            .create_table("docs", |t| {
                t.jsonb("doc");
            })
            .compile(&GenericDialect)
            .expect_err("jsonb is not a generic type");
        assert_eq!(
            error.to_string(),
            "Column type jsonb of column \"doc\" is not supported by generic"
        );
        let error = SchemaBuilder::new()
            .create_table("docs", |t| {
                t.integer("id");
                t.integer("  ");
            })
            .compile(&GenericDialect)
            .expect_err("A column needs a name");
        assert_eq!(error.to_string(), "Column at position 1 has no name");
    }

    #[test]
    fn literals_never_count_as_placeholders() {
        let statements = SchemaBuilder::new()
            .create_table("faq", |t| {
                t.text("question").default_to("what?");
                t.enu("kind", ["why?", "how"]);
                t.text("answer").default_raw(Raw::new(r"coalesce(?, 'none\?')").bind("ok?"));
                t.index(["question"], None);
            })
            .has_table("faq")
            .raw(Raw::new("select ? from ??").bind(1).bind("faq"))
            .compile(&GenericDialect)
            .expect("Could not compile the schema");
        assert_eq!(
            statements[0].sql,
            r#"create table "faq" ("question" text default 'what\?', "kind" text check ("kind" in ('why\?', 'how')), "answer" text default coalesce('ok\?', 'none\?'))"#
        );
        for statement in &statements {
            assert_eq!(
                count_placeholders(&statement.sql),
                statement.bindings.len(),
                "{}",
                statement.sql
            );
        }
        let error = SchemaBuilder::new()
            .create_table("faq", |t| {
                t.text("answer").default_raw(Raw::new("?"));
            })
            .compile(&GenericDialect)
            .expect_err("The default is missing its binding");
        assert_eq!(error.to_string(), "Expected 1 bindings, saw 0");
    }
}
