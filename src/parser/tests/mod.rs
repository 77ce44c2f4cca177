mod tests_expression;
