//! Recursive-descent parser (§4.6, §9) over the token stream from
//! `tokenizer`, producing a `Statement`. The grammar has no recursive
//! expressions beyond `AND`-conjoined predicate lists, so every production
//! below is a straight-line sequence of `expect`s.

use super::ast::*;
use super::errors::{unexpected, unexpected_eof, unknown_keyword};
use super::tokenizer::{tokenize, Spanned, Token};
use crate::core::common::error::OxidbError;
use crate::core::common::types::{DataType, Value};

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

/// Parses one complete statement out of `src`. Trailing tokens after a
/// well-formed statement are a syntax error.
pub fn parse(src: &str) -> Result<Statement, OxidbError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let statement = parser.parse_statement()?;
    if !matches!(parser.peek().token, Token::Eof) {
        return Err(unexpected(parser.peek(), "end of statement"));
    }
    Ok(statement)
}

impl Parser {
    fn peek(&self) -> &Spanned {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Spanned {
        let current = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        current
    }

    fn peek_is_keyword(&self, kw: &str) -> bool {
        matches!(&self.peek().token, Token::Ident(s) if s.eq_ignore_ascii_case(kw))
    }

    fn eat_keyword(&mut self, kw: &str) -> Result<(), OxidbError> {
        if self.peek_is_keyword(kw) {
            self.advance();
            Ok(())
        } else if matches!(self.peek().token, Token::Eof) {
            Err(unexpected_eof(kw, self.peek().position))
        } else {
            Err(unexpected(self.peek(), kw))
        }
    }

    fn ident(&mut self) -> Result<String, OxidbError> {
        match &self.peek().token {
            Token::Ident(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            Token::Eof => Err(unexpected_eof("identifier", self.peek().position)),
            _ => Err(unexpected(self.peek(), "identifier")),
        }
    }

    fn punct(&mut self, want: Token, name: &str) -> Result<(), OxidbError> {
        if self.peek().token == want {
            self.advance();
            Ok(())
        } else if matches!(self.peek().token, Token::Eof) {
            Err(unexpected_eof(name, self.peek().position))
        } else {
            Err(unexpected(self.peek(), name))
        }
    }

    fn literal(&mut self) -> Result<Value, OxidbError> {
        match self.peek().token.clone() {
            Token::Integer(i) => {
                self.advance();
                Ok(Value::Integer(i))
            }
            Token::Real(r) => {
                self.advance();
                Ok(Value::Real(r))
            }
            Token::StringLit(s) => {
                self.advance();
                Ok(Value::Text(s))
            }
            Token::Ident(s) => match s.to_ascii_uppercase().as_str() {
                "TRUE" => {
                    self.advance();
                    Ok(Value::Boolean(true))
                }
                "FALSE" => {
                    self.advance();
                    Ok(Value::Boolean(false))
                }
                "NULL" => {
                    self.advance();
                    Ok(Value::Null)
                }
                _ => Err(unexpected(self.peek(), "literal")),
            },
            Token::Eof => Err(unexpected_eof("literal", self.peek().position)),
            _ => Err(unexpected(self.peek(), "literal")),
        }
    }

    fn data_type(&mut self) -> Result<DataType, OxidbError> {
        let name = self.ident()?;
        match name.to_ascii_uppercase().as_str() {
            "INTEGER" => Ok(DataType::Integer),
            "REAL" => Ok(DataType::Real),
            "TEXT" => Ok(DataType::Text),
            "BOOLEAN" => Ok(DataType::Boolean),
            "DATE" => Ok(DataType::Date),
            other => Err(OxidbError::SyntaxError {
                message: format!("unknown column type '{other}'"),
                position: self.tokens[self.pos.saturating_sub(1)].position,
            }),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, OxidbError> {
        let keyword = self.ident()?.to_ascii_uppercase();
        match keyword.as_str() {
            "CREATE" => {
                let which = self.ident()?.to_ascii_uppercase();
                match which.as_str() {
                    "TABLE" => self.parse_create_table(),
                    "INDEX" => self.parse_create_index(),
                    _ => Err(unknown_keyword(self.peek())),
                }
            }
            "INSERT" => self.parse_insert(),
            "SELECT" => self.parse_select(),
            "UPDATE" => self.parse_update(),
            "DELETE" => self.parse_delete(),
            "BEGIN" => Ok(Statement::Begin),
            "COMMIT" => Ok(Statement::Commit),
            "ROLLBACK" => Ok(Statement::Rollback),
            _ => Err(unknown_keyword(&self.tokens[self.pos.saturating_sub(1)])),
        }
    }

    fn parse_create_table(&mut self) -> Result<Statement, OxidbError> {
        let name = self.ident()?;
        self.punct(Token::LParen, "'('")?;
        let mut columns = vec![self.parse_column_decl()?];
        while self.peek().token == Token::Comma {
            self.advance();
            columns.push(self.parse_column_decl()?);
        }
        self.punct(Token::RParen, "')'")?;
        Ok(Statement::CreateTable(CreateTableStatement { name, columns }))
    }

    fn parse_column_decl(&mut self) -> Result<ColumnDecl, OxidbError> {
        let name = self.ident()?;
        let data_type = self.data_type()?;
        let mut constraints = Vec::new();
        loop {
            if self.peek_is_keyword("PRIMARY") {
                self.advance();
                self.eat_keyword("KEY")?;
                constraints.push(ColumnConstraint::PrimaryKey);
            } else if self.peek_is_keyword("NOT") {
                self.advance();
                self.eat_keyword("NULL")?;
                constraints.push(ColumnConstraint::NotNull);
            } else if self.peek_is_keyword("UNIQUE") {
                self.advance();
                constraints.push(ColumnConstraint::Unique);
            } else if self.peek_is_keyword("FOREIGN") {
                self.advance();
                self.eat_keyword("KEY")?;
                self.punct(Token::LParen, "'('")?;
                let fk_column = self.ident()?;
                self.punct(Token::RParen, "')'")?;
                self.eat_keyword("REFERENCES")?;
                let ref_table = self.ident()?;
                self.punct(Token::LParen, "'('")?;
                let ref_column = self.ident()?;
                self.punct(Token::RParen, "')'")?;
                constraints.push(ColumnConstraint::ForeignKey { column: fk_column, ref_table, ref_column });
            } else {
                break;
            }
        }
        Ok(ColumnDecl { name, data_type, constraints })
    }

    fn parse_create_index(&mut self) -> Result<Statement, OxidbError> {
        let index_name = self.ident()?;
        self.eat_keyword("ON")?;
        let table = self.ident()?;
        self.punct(Token::LParen, "'('")?;
        let column = self.ident()?;
        self.punct(Token::RParen, "')'")?;
        Ok(Statement::CreateIndex(CreateIndexStatement { index_name, table, column }))
    }

    fn parse_insert(&mut self) -> Result<Statement, OxidbError> {
        self.eat_keyword("INTO")?;
        let table = self.ident()?;
        self.eat_keyword("VALUES")?;
        self.punct(Token::LParen, "'('")?;
        let mut values = vec![self.literal()?];
        while self.peek().token == Token::Comma {
            self.advance();
            values.push(self.literal()?);
        }
        self.punct(Token::RParen, "')'")?;
        Ok(Statement::Insert(InsertStatement { table, values }))
    }

    fn parse_proj_item(&mut self) -> Result<ProjItem, OxidbError> {
        if self.peek().token == Token::Star {
            self.advance();
            return Ok(ProjItem::Star);
        }
        let name = self.ident()?;
        let upper = name.to_ascii_uppercase();
        let func = match upper.as_str() {
            "COUNT" => Some(AggregateFunc::Count),
            "SUM" => Some(AggregateFunc::Sum),
            "AVG" => Some(AggregateFunc::Avg),
            "MIN" => Some(AggregateFunc::Min),
            "MAX" => Some(AggregateFunc::Max),
            _ => None,
        };
        if let Some(func) = func {
            if self.peek().token == Token::LParen {
                self.advance();
                let arg = if self.peek().token == Token::Star {
                    self.advance();
                    AggregateArg::Star
                } else {
                    let first = self.ident()?;
                    if self.peek().token == Token::Dot {
                        self.advance();
                        let column = self.ident()?;
                        AggregateArg::Column { table: Some(first), column }
                    } else {
                        AggregateArg::Column { table: None, column: first }
                    }
                };
                self.punct(Token::RParen, "')'")?;
                return Ok(ProjItem::Aggregate { func, arg });
            }
        }
        if self.peek().token == Token::Dot {
            self.advance();
            let column = self.ident()?;
            Ok(ProjItem::Column { table: Some(name), column })
        } else {
            Ok(ProjItem::Column { table: None, column: name })
        }
    }

    fn parse_proj_list(&mut self) -> Result<Vec<ProjItem>, OxidbError> {
        let mut items = vec![self.parse_proj_item()?];
        while self.peek().token == Token::Comma {
            self.advance();
            items.push(self.parse_proj_item()?);
        }
        Ok(items)
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp, OxidbError> {
        match self.peek().token.clone() {
            Token::Eq => {
                self.advance();
                Ok(CompareOp::Eq)
            }
            Token::Lt => {
                self.advance();
                Ok(CompareOp::Lt)
            }
            Token::Gt => {
                self.advance();
                Ok(CompareOp::Gt)
            }
            Token::Ident(s) if s.eq_ignore_ascii_case("LIKE") => {
                self.advance();
                Ok(CompareOp::Like)
            }
            _ => Err(unexpected(self.peek(), "a comparison operator ('=', '<', '>', LIKE)")),
        }
    }

    fn parse_predicate(&mut self) -> Result<PredicateClause, OxidbError> {
        let first = self.ident()?;
        let (table, column) = if self.peek().token == Token::Dot {
            self.advance();
            (Some(first), self.ident()?)
        } else {
            (None, first)
        };
        let op = self.parse_compare_op()?;
        let operand = self.literal()?;
        Ok(PredicateClause { table, column, op, operand })
    }

    fn parse_predicate_list(&mut self) -> Result<Vec<PredicateClause>, OxidbError> {
        let mut predicates = vec![self.parse_predicate()?];
        while self.peek_is_keyword("AND") {
            self.advance();
            predicates.push(self.parse_predicate()?);
        }
        Ok(predicates)
    }

    fn parse_where_opt(&mut self) -> Result<Vec<PredicateClause>, OxidbError> {
        if self.peek_is_keyword("WHERE") {
            self.advance();
            self.parse_predicate_list()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_select(&mut self) -> Result<Statement, OxidbError> {
        let projections = self.parse_proj_list()?;
        self.eat_keyword("FROM")?;
        let from = self.ident()?;

        let join = if self.peek_is_keyword("JOIN") {
            self.advance();
            let right_table = self.ident()?;
            self.eat_keyword("ON")?;
            let on_left_table = self.ident()?;
            self.punct(Token::Dot, "'.'")?;
            let on_left_column = self.ident()?;
            self.punct(Token::Eq, "'='")?;
            let on_right_table = self.ident()?;
            self.punct(Token::Dot, "'.'")?;
            let on_right_column = self.ident()?;
            Some(JoinClause { right_table, on_left_table, on_left_column, on_right_table, on_right_column })
        } else {
            None
        };

        let predicates = self.parse_where_opt()?;

        let group_by = if self.peek_is_keyword("GROUP") {
            self.advance();
            self.eat_keyword("BY")?;
            let mut cols = vec![self.ident()?];
            while self.peek().token == Token::Comma {
                self.advance();
                cols.push(self.ident()?);
            }
            cols
        } else {
            Vec::new()
        };

        Ok(Statement::Select(SelectStatement { projections, from, join, predicates, group_by }))
    }

    fn parse_update(&mut self) -> Result<Statement, OxidbError> {
        let table = self.ident()?;
        self.eat_keyword("SET")?;
        let mut assignments = vec![self.parse_assignment()?];
        while self.peek().token == Token::Comma {
            self.advance();
            assignments.push(self.parse_assignment()?);
        }
        let predicates = self.parse_where_opt()?;
        Ok(Statement::Update(UpdateStatement { table, assignments, predicates }))
    }

    fn parse_assignment(&mut self) -> Result<(String, Value), OxidbError> {
        let column = self.ident()?;
        self.punct(Token::Eq, "'='")?;
        let value = self.literal()?;
        Ok((column, value))
    }

    fn parse_delete(&mut self) -> Result<Statement, OxidbError> {
        self.eat_keyword("FROM")?;
        let table = self.ident()?;
        let predicates = self.parse_where_opt()?;
        Ok(Statement::Delete(DeleteStatement { table, predicates }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_table_with_constraints() {
        let stmt = parse(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE, age INTEGER NOT NULL)",
        )
        .unwrap();
        match stmt {
            Statement::CreateTable(ct) => {
                assert_eq!(ct.name, "users");
                assert_eq!(ct.columns.len(), 3);
                assert!(ct.columns[0].constraints.contains(&ColumnConstraint::PrimaryKey));
                assert!(ct.columns[1].constraints.contains(&ColumnConstraint::Unique));
                assert!(ct.columns[2].constraints.contains(&ColumnConstraint::NotNull));
            }
            _ => panic!("expected CreateTable"),
        }
    }

    #[test]
    fn parses_foreign_key_constraint() {
        let stmt = parse(
            "CREATE TABLE orders (oid INTEGER PRIMARY KEY, uid INTEGER FOREIGN KEY (uid) REFERENCES users(id))",
        )
        .unwrap();
        match stmt {
            Statement::CreateTable(ct) => {
                assert_eq!(
                    ct.columns[1].constraints[0],
                    ColumnConstraint::ForeignKey {
                        column: "uid".into(),
                        ref_table: "users".into(),
                        ref_column: "id".into(),
                    }
                );
            }
            _ => panic!("expected CreateTable"),
        }
    }

    #[test]
    fn parses_create_index() {
        let stmt = parse("CREATE INDEX idx_name ON users (name)").unwrap();
        assert_eq!(
            stmt,
            Statement::CreateIndex(CreateIndexStatement {
                index_name: "idx_name".into(),
                table: "users".into(),
                column: "name".into(),
            })
        );
    }

    #[test]
    fn parses_insert_with_mixed_literals() {
        let stmt = parse("insert into users values (1, 'Alice', TRUE, NULL, '2024-01-15')").unwrap();
        match stmt {
            Statement::Insert(ins) => {
                assert_eq!(ins.table, "users");
                assert_eq!(
                    ins.values,
                    vec![
                        Value::Integer(1),
                        Value::Text("Alice".into()),
                        Value::Boolean(true),
                        Value::Null,
                        Value::Text("2024-01-15".into()),
                    ]
                );
            }
            _ => panic!("expected Insert"),
        }
    }

    #[test]
    fn parses_select_with_join_where_and_group_by() {
        let stmt = parse(
            "SELECT type, COUNT(*), SUM(amt) FROM tx JOIN cat ON tx.cid = cat.id WHERE amt > 0 AND type = 'CR' GROUP BY type",
        )
        .unwrap();
        match stmt {
            Statement::Select(sel) => {
                assert_eq!(sel.projections.len(), 3);
                assert!(sel.join.is_some());
                assert_eq!(sel.predicates.len(), 2);
                assert_eq!(sel.group_by, vec!["type".to_string()]);
            }
            _ => panic!("expected Select"),
        }
    }

    #[test]
    fn parses_select_star_no_clauses() {
        let stmt = parse("SELECT * FROM users").unwrap();
        match stmt {
            Statement::Select(sel) => {
                assert_eq!(sel.projections, vec![ProjItem::Star]);
                assert_eq!(sel.from, "users");
            }
            _ => panic!("expected Select"),
        }
    }

    #[test]
    fn parses_update_and_delete() {
        let upd = parse("UPDATE users SET name = 'Alicia' WHERE id = 1").unwrap();
        assert!(matches!(upd, Statement::Update(_)));
        let del = parse("DELETE FROM users WHERE id = 2").unwrap();
        assert!(matches!(del, Statement::Delete(_)));
    }

    #[test]
    fn parses_transaction_keywords() {
        assert_eq!(parse("BEGIN").unwrap(), Statement::Begin);
        assert_eq!(parse("COMMIT").unwrap(), Statement::Commit);
        assert_eq!(parse("ROLLBACK").unwrap(), Statement::Rollback);
    }

    #[test]
    fn trailing_garbage_is_syntax_error() {
        assert!(matches!(parse("BEGIN EXTRA"), Err(OxidbError::SyntaxError { .. })));
    }

    #[test]
    fn missing_from_is_syntax_error() {
        assert!(matches!(parse("SELECT * users"), Err(OxidbError::SyntaxError { .. })));
    }

    #[test]
    fn like_predicate_parses() {
        let stmt = parse("SELECT * FROM users WHERE name LIKE 'A%'").unwrap();
        match stmt {
            Statement::Select(sel) => {
                assert_eq!(sel.predicates[0].op, CompareOp::Like);
            }
            _ => panic!("expected Select"),
        }
    }
}
