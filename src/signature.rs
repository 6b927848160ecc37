//! Parsing and validation of JNI method signatures.
//!
//! Registry entries carry their signature as a string; validating them at load
//! time turns a typo in the embedded registry into a startup error instead of
//! a reflection failure at call time.

use std::iter::Peekable;
use std::str::Chars;

/// Checks that a full method signature such as `(ILjava/lang/String;)Z` is
/// well formed.
pub fn validate(signature: &str) -> Result<(), &'static str> {
    parameter_types(signature)?;
    return_type(signature)?;
    Ok(())
}

/// Extracts parameter types from a JNI method signature
///
/// # Example
/// `(ILjava/lang/String;)V` -> `["I", "Ljava/lang/String;"]`
pub fn parameter_types(signature: &str) -> Result<Vec<String>, &'static str> {
    let start = signature
        .find('(')
        .ok_or("missing opening parenthesis")?;
    let end = signature
        .find(')')
        .ok_or("missing closing parenthesis")?;

    if start != 0 || start >= end {
        return Err("malformed parentheses");
    }

    let mut chars = signature[start + 1..end].chars().peekable();
    let mut types = Vec::new();

    while chars.peek().is_some() {
        types.push(read_type(&mut chars)?);
    }

    Ok(types)
}

/// Extracts the return type, `"V"` for void.
pub fn return_type(signature: &str) -> Result<String, &'static str> {
    let end = signature
        .find(')')
        .ok_or("missing closing parenthesis")?;

    let mut chars = signature[end + 1..].chars().peekable();
    let ty = if chars.peek() == Some(&'V') {
        chars.next();
        String::from("V")
    } else {
        read_type(&mut chars)?
    };

    if chars.peek().is_some() {
        return Err("trailing characters after return type");
    }

    Ok(ty)
}

fn read_type(chars: &mut Peekable<Chars>) -> Result<String, &'static str> {
    match chars.next() {
        // Primitive types
        Some(ch @ ('Z' | 'B' | 'C' | 'S' | 'I' | 'J' | 'F' | 'D')) => Ok(ch.to_string()),
        // Object types
        Some('L') => {
            let mut object_type = String::from("L");
            for ch in chars.by_ref() {
                object_type.push(ch);
                if ch == ';' {
                    return Ok(object_type);
                }
            }
            Err("unterminated object type")
        }
        // Array types, including nested arrays
        Some('[') => {
            let component = read_type(chars)?;
            Ok(format!("[{}", component))
        }
        Some(_) => Err("unknown type character"),
        None => Err("empty type"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_parameter_types() {
        assert_eq!(parameter_types("()V").unwrap(), Vec::<String>::new());

        assert_eq!(parameter_types("(I)V").unwrap(), vec!["I"]);

        assert_eq!(
            parameter_types("(ILjava/lang/String;F)V").unwrap(),
            vec!["I", "Ljava/lang/String;", "F"]
        );

        // Arrays, including nested and object arrays
        assert_eq!(parameter_types("([I)V").unwrap(), vec!["[I"]);
        assert_eq!(
            parameter_types("([[Ljava/lang/String;)V").unwrap(),
            vec!["[[Ljava/lang/String;"]
        );
    }

    #[test]
    fn extracts_return_types() {
        assert_eq!(return_type("()V").unwrap(), "V");
        assert_eq!(return_type("()Z").unwrap(), "Z");
        assert_eq!(
            return_type("(Lorg/bukkit/inventory/ItemStack;)Lorg/bukkit/potion/Potion;").unwrap(),
            "Lorg/bukkit/potion/Potion;"
        );
    }

    #[test]
    fn accepts_registry_style_signatures() {
        for signature in [
            "(Lorg/bukkit/inventory/ItemStack;)Lorg/bukkit/potion/Potion;",
            "()Ljava/util/Collection;",
            "()Z",
            "()Lorg/bukkit/DyeColor;",
        ] {
            assert!(validate(signature).is_ok(), "expected '{}' to validate", signature);
        }
    }

    #[test]
    fn rejects_malformed_signatures() {
        assert!(validate("IV").is_err());
        assert!(validate("(Ljava/lang/String)V").is_err());
        assert!(validate("(Q)V").is_err());
        assert!(validate("()").is_err());
        assert!(validate("()VV").is_err());
        assert!(validate(")(V").is_err());
    }
}
