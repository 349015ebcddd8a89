#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quill_core::{
        CompiledStatement, Config, DdlError, Filter, Method, MonotonicIds, Operator, QueryBuilder,
        QueryOutput, Record, Runner, SchemaBuilder, Value, record,
    };
    use quill_sqlite::SqliteDialect;
    use quill_tests::{SqliteTestConnection, init_logs, silent_logs};
    use std::sync::Arc;

    fn dialect() -> SqliteDialect {
        SqliteDialect::with_ids(Arc::new(MonotonicIds::starting_at(7)))
    }

    fn sql(statements: &[CompiledStatement]) -> Vec<&str> {
        statements.iter().map(|v| v.sql.as_str()).collect()
    }

    fn connection(fixture: &str) -> SqliteTestConnection {
        let connection = SqliteTestConnection::open().expect("Could not open the database");
        connection.batch(fixture).expect("Could not load the fixture");
        connection
    }

    async fn select_all(
        dialect: &SqliteDialect,
        connection: &mut SqliteTestConnection,
        table: &str,
    ) -> Vec<Record> {
        let statement = QueryBuilder::table(table)
            .compile(dialect)
            .expect("Could not compile the select");
        Runner::new(dialect, connection)
            .run(&statement)
            .await
            .expect("Could not select the rows")
            .rows()
            .expect("Expected rows")
            .into_iter()
            .map(|v| v.into_record())
            .collect()
    }

    #[test]
    fn compile_queries() {
        let dialect = dialect();
        let statement = QueryBuilder::table("users")
            .where_op("name", Operator::ILike, "%a%")
            .offset(10)
            .for_update()
            .compile(&dialect)
            .expect("Could not compile the query");
        assert_eq!(
            statement.sql,
            r#"select * from "users" where "name" like ? limit ? offset ?"#
        );
        assert_eq!(
            statement.bindings,
            [Value::Text("%a%".into()), Value::Int(-1), Value::Int(10)]
        );

        let statement = QueryBuilder::table("users")
            .insert_many([record! { "a" => 1, "b" => 2 }, record! { "a" => 3 }])
            .compile(&dialect)
            .expect("Could not compile the insert");
        assert_eq!(
            statement.sql,
            r#"insert into "users" ("a", "b") values (?, ?), (?, NULL)"#
        );

        let statement = QueryBuilder::table("users")
            .truncate()
            .compile(&dialect)
            .expect("Could not compile the truncate");
        assert_eq!(statement.sql, r#"delete from "users""#);
        assert_eq!(statement.method, Method::Truncate);
        assert!(statement.output.is_some());

        let statement = QueryBuilder::table("users")
            .column_info(None)
            .compile(&dialect)
            .expect("Could not compile the column info");
        assert_eq!(statement.sql, r#"pragma table_info("users")"#);
    }

    #[test]
    fn infinite_floats() {
        let dialect = dialect();
        let mut out = String::new();
        quill_core::Dialect::write_value(&dialect, &mut out, &Value::Float(f64::INFINITY));
        assert_eq!(out, "1.0e+10000");
        out.clear();
        quill_core::Dialect::write_value(&dialect, &mut out, &Value::Float(f64::NEG_INFINITY));
        assert_eq!(out, "-1.0e+10000");
    }

    #[test]
    fn compile_schema() {
        let dialect = dialect();
        let statements = SchemaBuilder::new()
            .create_table("posts", |t| {
                t.increments("id");
                t.integer("user_id")
                    .references("users.id")
                    .on_delete("cascade");
                t.jsonb("data");
            })
            .has_table("posts")
            .has_column("posts", "data")
            .create_schema("audit", true)
            .compile(&dialect)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            [
                indoc! {r#"
                    create table "posts" (
                    "id" integer not null primary key autoincrement,
                    "user_id" integer,
                    "data" json,
                    constraint "posts_user_id_foreign" foreign key("user_id") references "users" ("id") on delete cascade)
                "#}
                .trim()
                .replace("(\n", "(")
                .replace(",\n", ", ")
                .replace("\n", " ")
                .as_str(),
                r#"select * from sqlite_master where type = 'table' and name = ?"#,
                r#"pragma table_info("posts")"#,
            ]
        );
        assert_eq!(statements[1].method, Method::HasTable);
        assert_eq!(statements[2].method, Method::HasColumn);
    }

    #[test]
    fn compile_rebuilds() {
        let dialect = dialect();
        let statements = SchemaBuilder::new()
            .alter_table("users", |t| {
                t.rename_column("name", "full_name");
                t.drop_columns(["a", "b"]);
                t.drop_foreign(["team_id"], None);
                t.drop_primary(None);
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        assert_eq!(sql(&statements), [r#"pragma table_info("users")"#; 4]);
        assert!(statements.iter().all(|v| v.method == Method::Ddl));
        assert!(statements.iter().all(|v| v.output.is_some()));
    }

    #[tokio::test]
    async fn rename_column() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection(indoc! {"
            CREATE TABLE t (id integer primary key, name text);
            INSERT INTO t (id, name) VALUES (1, 'a'), (2, 'b');
        "});
        let statements = SchemaBuilder::new()
            .alter_table("t", |t| {
                t.rename_column("name", "full_name");
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not rename the column");
        assert_eq!(
            connection.table_sql("t").expect("Table must exist"),
            "CREATE TABLE t (id integer primary key, full_name text)"
        );
        assert_eq!(
            connection.executed(),
            [
                r#"pragma table_info("t")"#,
                r#"select "sql" from "sqlite_master" where "type" = ? and "name" = ?"#,
                r#"select "sql" from "sqlite_master" where "type" = ? and "tbl_name" = ? and "sql" is not null"#,
                r#"CREATE TABLE "7_quill_temp_alter" (id integer primary key, name text)"#,
                r#"select * from "t""#,
                r#"insert into "7_quill_temp_alter" ("id", "name") values (?, ?), (?, ?)"#,
                r#"drop table "t""#,
                "CREATE TABLE t (id integer primary key, full_name text)",
                r#"select * from "7_quill_temp_alter""#,
                r#"insert into "t" ("full_name", "id") values (?, ?), (?, ?)"#,
                r#"drop table "7_quill_temp_alter""#,
            ]
        );
        assert_eq!(
            select_all(&dialect, &mut connection, "t").await,
            [
                record! { "id" => 1, "full_name" => "a" },
                record! { "id" => 2, "full_name" => "b" },
            ]
        );
    }

    #[tokio::test]
    async fn last_column_guard() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection(indoc! {"
            CREATE TABLE t (a integer);
            INSERT INTO t (a) VALUES (1);
        "});
        let statements = SchemaBuilder::new()
            .alter_table("t", |t| {
                t.drop_column("a");
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        let mut runner = Runner::new(&dialect, &mut connection);
        silent_logs! {
            let error = runner
                .run_all(&statements)
                .await
                .expect_err("Dropping the last column must fail");
            assert!(matches!(
                error.downcast_ref::<DdlError>(),
                Some(DdlError::LastColumn)
            ));
        }
        assert!(
            connection
                .executed()
                .iter()
                .all(|v| !v.starts_with("CREATE") && !v.starts_with("drop"))
        );
        assert_eq!(
            connection.table_sql("t").expect("Table must exist"),
            "CREATE TABLE t (a integer)"
        );
        assert_eq!(
            select_all(&dialect, &mut connection, "t").await,
            [record! { "a" => 1 }]
        );
    }

    #[tokio::test]
    async fn column_not_found() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection("CREATE TABLE t (a integer, b integer);");
        let statements = SchemaBuilder::new()
            .alter_table("t", |t| {
                t.rename_column("missing", "c");
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        let mut runner = Runner::new(&dialect, &mut connection);
        silent_logs! {
            let error = runner
                .run_all(&statements)
                .await
                .expect_err("Renaming an unknown column must fail");
            assert!(matches!(
                error.downcast_ref::<DdlError>(),
                Some(DdlError::ColumnNotFound { column, table })
                    if column == "missing" && table == "t"
            ));
        }
    }

    #[tokio::test]
    async fn drop_column_cascades_constraints() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection(indoc! {"
            CREATE TABLE t (a integer, b integer, c integer, unique (a, b));
            INSERT INTO t (a, b, c) VALUES (1, 2, 3), (4, 5, 6);
        "});
        let statements = SchemaBuilder::new()
            .alter_table("t", |t| {
                t.drop_column("a");
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not drop the column");
        assert_eq!(
            connection.table_sql("t").expect("Table must exist"),
            "CREATE TABLE t (b integer, c integer)"
        );
        assert_eq!(
            select_all(&dialect, &mut connection, "t").await,
            [record! { "b" => 2, "c" => 3 }, record! { "b" => 5, "c" => 6 }]
        );
    }

    #[tokio::test]
    async fn rows_move_in_chunks() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection("CREATE TABLE t (id integer primary key, name text);");
        let rows = (1..=25).map(|i| record! { "id" => i, "name" => format!("row {i}") });
        let inserts = quill_core::batch_insert(&dialect, &Config::default(), "t", rows, 100)
            .expect("Could not compile the inserts");
        Runner::new(&dialect, &mut connection)
            .run_all(&inserts)
            .await
            .expect("Could not insert the rows");
        let statements = SchemaBuilder::new()
            .alter_table("t", |t| {
                t.rename_column("name", "label");
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not rename the column");
        let count = |prefix: &str| {
            connection
                .executed()
                .iter()
                .filter(|v| v.starts_with(prefix))
                .count()
        };
        assert_eq!(count(r#"insert into "7_quill_temp_alter""#), 2);
        // One from the fixture, two copying the rows back
        assert_eq!(count(r#"insert into "t""#), 3);
        let rows = select_all(&dialect, &mut connection, "t").await;
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[24], record! { "id" => 25, "label" => "row 25" });
    }

    #[tokio::test]
    async fn custom_chunk_size() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection(indoc! {"
            CREATE TABLE t (id integer primary key, name text);
            INSERT INTO t (name) VALUES ('a'), ('b'), ('c'), ('d'), ('e');
        "});
        let statements = SchemaBuilder::new()
            .alter_table("t", |t| {
                t.drop_column("name");
            })
            .compile_with(&dialect, &Config::new().migration_chunk_size(2))
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not drop the column");
        let inserts = connection
            .executed()
            .iter()
            .filter(|v| v.starts_with("insert into"))
            .count();
        assert_eq!(inserts, 6);
        assert_eq!(select_all(&dialect, &mut connection, "t").await.len(), 5);
    }

    #[tokio::test]
    async fn alter_column() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection(indoc! {"
            CREATE TABLE t (id integer primary key, age text);
            INSERT INTO t (id, age) VALUES (1, '30');
        "});
        let statements = SchemaBuilder::new()
            .alter_table("t", |t| {
                t.integer("age").not_nullable().alter();
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not alter the column");
        assert_eq!(
            connection.table_sql("t").expect("Table must exist"),
            r#"CREATE TABLE t (id integer primary key, "age" integer not null)"#
        );
        assert_eq!(
            select_all(&dialect, &mut connection, "t").await,
            [record! { "id" => 1, "age" => 30 }]
        );
    }

    #[tokio::test]
    async fn drop_foreign() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection("CREATE TABLE users (id integer primary key);");
        let statements = SchemaBuilder::new()
            .create_table("posts", |t| {
                t.increments("id");
                t.integer("user_id").references("users.id");
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not create the table");
        let statements = SchemaBuilder::new()
            .alter_table("posts", |t| {
                t.drop_foreign(["user_id"], None);
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not drop the foreign key");
        assert_eq!(
            connection.table_sql("posts").expect("Table must exist"),
            r#"CREATE TABLE "posts" ("id" integer not null primary key autoincrement, "user_id" integer)"#
        );
    }

    #[tokio::test]
    async fn truncate_resets_sequence() {
        init_logs();
        let dialect = dialect();
        let mut connection = SqliteTestConnection::open().expect("Could not open the database");
        let mut statements = SchemaBuilder::new()
            .create_table("items", |t| {
                t.increments("id");
                t.string("name", None);
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        let insert = QueryBuilder::table("items")
            .insert_many([
                record! { "name" => "a" },
                record! { "name" => "b" },
                record! { "name" => "c" },
            ])
            .compile(&dialect)
            .expect("Could not compile the insert");
        statements.push(insert);
        statements.push(
            QueryBuilder::table("items")
                .truncate()
                .compile(&dialect)
                .expect("Could not compile the truncate"),
        );
        let output = Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not run the statements");
        assert_eq!(output.affected().map(|v| v.rows_affected), Some(3));
        assert_eq!(
            connection.executed().last().map(String::as_str),
            Some("delete from sqlite_sequence where name = ?")
        );
        let statement = QueryBuilder::table("items")
            .insert(record! { "name" => "d" })
            .compile(&dialect)
            .expect("Could not compile the insert");
        Runner::new(&dialect, &mut connection)
            .run(&statement)
            .await
            .expect("Could not insert");
        assert_eq!(
            select_all(&dialect, &mut connection, "items").await,
            [record! { "id" => 1, "name" => "d" }]
        );
    }

    #[tokio::test]
    async fn upsert() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection(indoc! {"
            CREATE TABLE users (id integer primary key, email text unique, name text);
            INSERT INTO users (id, email, name) VALUES (1, 'a@b.c', 'first');
        "});
        let ignore = QueryBuilder::table("users")
            .insert(record! { "id" => 2, "email" => "a@b.c", "name" => "second" })
            .on_conflict(["email"])
            .ignore()
            .compile(&dialect)
            .expect("Could not compile the insert");
        assert_eq!(
            ignore.sql,
            r#"insert into "users" ("email", "id", "name") values (?, ?, ?) on conflict ("email") do nothing"#
        );
        let output = Runner::new(&dialect, &mut connection)
            .run(&ignore)
            .await
            .expect("Could not insert");
        assert_eq!(output.affected().map(|v| v.rows_affected), Some(0));
        assert_eq!(
            select_all(&dialect, &mut connection, "users").await,
            [record! { "id" => 1, "email" => "a@b.c", "name" => "first" }]
        );

        let merge = QueryBuilder::table("users")
            .insert(record! { "email" => "a@b.c", "name" => "merged" })
            .on_conflict(["email"])
            .merge_columns(["name"])
            .compile(&dialect)
            .expect("Could not compile the insert");
        Runner::new(&dialect, &mut connection)
            .run(&merge)
            .await
            .expect("Could not insert");
        assert_eq!(
            select_all(&dialect, &mut connection, "users").await,
            [record! { "id" => 1, "email" => "a@b.c", "name" => "merged" }]
        );
    }

    #[tokio::test]
    async fn introspection() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection(
            "CREATE TABLE t (id integer primary key, name varchar(40) not null default 'x');",
        );
        let statement = QueryBuilder::table("t")
            .column_info(None)
            .compile(&dialect)
            .expect("Could not compile the column info");
        let QueryOutput::Columns(columns) = Runner::new(&dialect, &mut connection)
            .run(&statement)
            .await
            .expect("Could not read the columns")
        else {
            panic!("Expected columns");
        };
        assert_eq!(columns.len(), 2);
        let name = &columns["name"];
        assert_eq!(name.data_type, "varchar");
        assert_eq!(name.max_length, Some(40));
        assert!(!name.nullable);
        assert_eq!(name.default_value.as_deref(), Some("'x'"));
        assert!(columns["id"].nullable);

        let statements = SchemaBuilder::new()
            .has_table("t")
            .compile(&dialect)
            .expect("Could not compile the schema");
        let output = Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not check the table");
        assert_eq!(output.exists(), Some(true));

        for (column, expected) in [("NAME", true), ("missing", false)] {
            let statements = SchemaBuilder::new()
                .has_column("t", column)
                .compile(&dialect)
                .expect("Could not compile the schema");
            let output = Runner::new(&dialect, &mut connection)
                .run_all(&statements)
                .await
                .expect("Could not check the column");
            assert_eq!(output.exists(), Some(expected));
        }

        let select = QueryBuilder::table("t")
            .where_("id", 1)
            .compile(&dialect)
            .expect("Could not compile the select");
        let rows = Runner::new(&dialect, &mut connection)
            .run(&select)
            .await
            .expect("Could not select")
            .rows()
            .expect("Expected rows");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn table_without_columns() {
        init_logs();
        let dialect = dialect();
        let statements = SchemaBuilder::new()
            .create_table("t", |_| {})
            .compile(&dialect)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            [r#"create table "t" ("id" integer not null primary key autoincrement)"#]
        );
        let mut connection = SqliteTestConnection::open().expect("Could not open the database");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not create the table");
        assert!(select_all(&dialect, &mut connection, "t").await.is_empty());
    }

    #[tokio::test]
    async fn rebuild_keeps_indexes() {
        init_logs();
        let dialect = dialect();
        let mut connection = SqliteTestConnection::open().expect("Could not open the database");
        let statements = SchemaBuilder::new()
            .create_table("u", |t| {
                t.increments("id");
                t.string("email", None);
                t.string("name", None);
                t.unique(["email"], None);
                t.index(["name"], None);
            })
            .alter_table("u", |t| {
                t.rename_column("name", "full_name");
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not create and rebuild the table");
        assert_eq!(
            connection.index_sql("u").expect("Could not read the indexes"),
            [
                r#"create unique index "u_email_unique" on "u" ("email")"#,
                r#"create index "u_name_index" on "u" ("full_name")"#,
            ]
        );

        let insert = QueryBuilder::table("u")
            .insert(record! { "email" => "a", "full_name" => "first" })
            .compile(&dialect)
            .expect("Could not compile the insert");
        Runner::new(&dialect, &mut connection)
            .run(&insert)
            .await
            .expect("Could not insert");
        let mut runner = Runner::new(&dialect, &mut connection);
        silent_logs! {
            runner
                .run(&insert)
                .await
                .expect_err("The email must still be unique");
        }

        let statements = SchemaBuilder::new()
            .alter_table("u", |t| {
                t.drop_column("full_name");
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not drop the column");
        assert_eq!(
            connection.index_sql("u").expect("Could not read the indexes"),
            [r#"create unique index "u_email_unique" on "u" ("email")"#]
        );
        assert_eq!(
            select_all(&dialect, &mut connection, "u").await,
            [record! { "id" => 1, "email" => "a" }]
        );
    }

    #[tokio::test]
    async fn rebuild_keeps_literals() {
        init_logs();
        let dialect = dialect();
        let mut connection = connection(indoc! {"
            CREATE TABLE t (id integer primary key, note text default 'a  b?', age text);
            INSERT INTO t (id, age) VALUES (1, '30');
        "});
        let statements = SchemaBuilder::new()
            .alter_table("t", |t| {
                t.string("age", Some(10)).default_to("why?").alter();
            })
            .compile(&dialect)
            .expect("Could not compile the schema");
        Runner::new(&dialect, &mut connection)
            .run_all(&statements)
            .await
            .expect("Could not alter the column");
        assert_eq!(
            connection.table_sql("t").expect("Table must exist"),
            r#"CREATE TABLE t (id integer primary key, note text default 'a  b?', "age" varchar(10) default 'why?')"#
        );
        assert_eq!(
            select_all(&dialect, &mut connection, "t").await,
            [record! { "id" => 1, "note" => "a  b?", "age" => "30" }]
        );
    }
}
