#[cfg(test)]
mod tests {
    use indoc::indoc;
    use quill_core::{
        CompiledStatement, Dialect, Filter, QueryBuilder, SchemaBuilder, Value, record,
    };
    use quill_mysql::MySqlDialect;

    const DIALECT: MySqlDialect = MySqlDialect;

    fn compile(query: QueryBuilder) -> CompiledStatement {
        query.compile(&DIALECT).expect("Could not compile the query")
    }

    fn sql(statements: &[CompiledStatement]) -> Vec<&str> {
        statements.iter().map(|v| v.sql.as_str()).collect()
    }

    #[test]
    fn quoting() {
        assert_eq!(
            compile(
                QueryBuilder::table("users")
                    .select(["users.id", "na`me"])
                    .where_("id", 1)
                    .for_share()
            )
            .sql,
            "select `users`.`id`, `na``me` from `users` where `id` = ? lock in share mode"
        );
        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Text(r"it's a \ test".into()));
        assert_eq!(out, r"'it''s a \\ test'");
    }

    #[test]
    fn offset_without_limit() {
        let statement = compile(QueryBuilder::table("users").offset(5).for_update());
        assert_eq!(
            statement.sql,
            "select * from `users` limit 18446744073709551615 offset ? for update"
        );
        assert_eq!(statement.bindings, [Value::Int(5)]);
    }

    #[test]
    fn upsert() {
        assert_eq!(
            compile(
                QueryBuilder::table("users")
                    .insert(record! { "email" => "a@b.c" })
                    .on_conflict(["email"])
                    .ignore()
            )
            .sql,
            "insert ignore into `users` (`email`) values (?)"
        );
        assert_eq!(
            compile(
                QueryBuilder::table("users")
                    .insert(record! { "email" => "a@b.c", "name" => "a" })
                    .on_conflict(["email"])
                    .merge()
            )
            .sql,
            indoc! {"
                insert into `users` (`email`, `name`) values (?, ?)
                on duplicate key update `email` = values(`email`), `name` = values(`name`)
            "}
            .trim()
            .replace('\n', " ")
        );
        let statement = compile(
            QueryBuilder::table("users")
                .insert(record! { "email" => "a@b.c", "name" => "a" })
                .on_conflict(["email"])
                .merge_with(record! { "name" => "b" }),
        );
        assert_eq!(
            statement.sql,
            "insert into `users` (`email`, `name`) values (?, ?) on duplicate key update `name` = ?"
        );
        assert_eq!(
            statement.bindings,
            [
                Value::Text("a@b.c".into()),
                Value::Text("a".into()),
                Value::Text("b".into()),
            ]
        );
    }

    #[test]
    fn returning_is_ignored() {
        let statement = compile(
            QueryBuilder::table("users")
                .insert(record! { "name" => "a" })
                .returning(["id"]),
        );
        assert_eq!(statement.sql, "insert into `users` (`name`) values (?)");
        assert!(!statement.returning);
    }

    #[test]
    fn create_table() {
        let statements = SchemaBuilder::new()
            .create_table("users", |t| {
                t.increments("id");
                t.integer("age")
                    .unsigned()
                    .nullable()
                    .default_to(0)
                    .comment("Years");
                t.enu("role", ["admin", "user"]);
                t.uuid("token");
                t.jsonb("data");
                t.index(["age"], None);
                t.comment("People");
            })
            .compile(&DIALECT)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            [
                indoc! {"
                    create table `users` (
                    `id` int unsigned not null auto_increment primary key,
                    `age` int unsigned null default 0 comment 'Years',
                    `role` enum('admin', 'user'),
                    `token` char(36),
                    `data` json)
                "}
                .trim()
                .replace("(\n", "(")
                .replace(",\n", ", ")
                .replace("\n", " ")
                .as_str(),
                "alter table `users` add index `users_age_index`(`age`)",
                "alter table `users` comment = 'People'",
            ]
        );
    }

    #[test]
    fn alter_table() {
        let statements = SchemaBuilder::new()
            .alter_table("users", |t| {
                t.string("nick", Some(40)).nullable().after("email").alter();
                t.unique(["email"], None);
                t.drop_unique(["email"], None);
                t.drop_foreign(["team_id"], None);
                t.drop_primary(None);
            })
            .rename_table("users", "people")
            .compile(&DIALECT)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            [
                "alter table `users` modify `nick` varchar(40) null after `email`",
                "alter table `users` add unique `users_email_unique`(`email`)",
                "alter table `users` drop index `users_email_unique`",
                "alter table `users` drop foreign key `users_team_id_foreign`",
                "alter table `users` drop primary key",
                "rename table `users` to `people`",
            ]
        );
    }

    #[test]
    fn introspection() {
        let statements = SchemaBuilder::new()
            .has_table("users")
            .compile(&DIALECT)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            ["select * from information_schema.tables where table_name = ? and table_schema = database()"]
        );
        let statement = compile(QueryBuilder::table("users").column_info(Some("email")));
        assert_eq!(
            statement.sql,
            "select * from information_schema.columns where table_name = ? and table_schema = database()"
        );
        assert_eq!(statement.bindings, [Value::Text("users".into())]);
    }

    #[test]
    fn table_without_columns() {
        let statements = SchemaBuilder::new()
            .create_table("t", |_| {})
            .compile(&DIALECT)
            .expect("Could not compile the schema");
        assert_eq!(
            sql(&statements),
            ["create table `t` (`id` int unsigned not null auto_increment primary key)"]
        );
    }
}
