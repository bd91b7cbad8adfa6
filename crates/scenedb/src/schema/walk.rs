use crate::schema::{FieldKind, FieldSchema};

/// Join a dotted prefix and a field name.
fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Flatten a schema into `(dotted path, kind)` pairs, depth-first: each
/// embedded field is followed immediately by its sub-paths. Implemented with
/// an explicit stack so arbitrarily deep nesting cannot overflow the call
/// stack.
#[must_use]
pub fn walk(schema: &FieldSchema) -> Vec<(String, &FieldKind)> {
    let mut flattened = Vec::new();
    let mut stack = vec![(String::new(), schema.iter())];

    while let Some((prefix, mut fields)) = stack.pop() {
        if let Some((name, kind)) = fields.next() {
            let path = join(&prefix, name);
            stack.push((prefix, fields));
            flattened.push((path.clone(), kind));

            if let Some(embedded) = kind.embedded_schema() {
                stack.push((path, embedded.fields.iter()));
            }
        }
    }

    flattened
}

/// Flatten the root schema, then (when a frame schema is supplied, i.e. the
/// collection holds video media) the frame schema with every path prefixed
/// by `frames.`.
#[must_use]
pub fn walk_with_frames<'a>(
    schema: &'a FieldSchema,
    frame_schema: Option<&'a FieldSchema>,
) -> Vec<(String, &'a FieldKind)> {
    let mut flattened = walk(schema);

    if let Some(frame_schema) = frame_schema {
        flattened.extend(
            walk(frame_schema)
                .into_iter()
                .map(|(path, kind)| (format!("frames.{path}"), kind)),
        );
    }

    flattened
}
