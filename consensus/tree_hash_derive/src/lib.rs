#![recursion_limit = "256"]
//! Provides procedural derive macros for the `TreeHash` and `SignedRoot` traits of the
//! `tree_hash` crate.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Returns a Vec of `syn::Ident` for each named field in the struct, whilst filtering out fields
/// that should not be hashed.
///
/// ## Panics
///
/// Any unnamed struct field (like in a tuple struct) will raise a panic at compile time.
fn get_hashable_fields(struct_data: &syn::DataStruct, attr_name: &str) -> Vec<syn::Ident> {
    struct_data
        .fields
        .iter()
        .filter_map(|f| {
            if should_skip_hashing(f, attr_name) {
                None
            } else {
                Some(match &f.ident {
                    Some(ident) => ident.clone(),
                    _ => panic!("tree_hash_derive only supports named struct fields."),
                })
            }
        })
        .collect()
}

/// Returns true if some field has an attribute declaring it should not be hashed.
///
/// The field attribute is: `#[tree_hash(skip_hashing)]` (or `#[signed_root(skip_hashing)]` for
/// the `SignedRoot` derive).
fn should_skip_hashing(field: &syn::Field, attr_name: &str) -> bool {
    field.attrs.iter().any(|attr| {
        attr.path.is_ident(attr_name) && attr.tokens.to_string().replace(' ', "") == "(skip_hashing)"
    })
}

/// Implements `tree_hash::TreeHash` for some `struct`, treating it as an SSZ container: the root
/// is the merkleization of the field roots, in definition order, padded to the next power of two.
///
/// ## Field attributes
///
/// - `#[tree_hash(skip_hashing)]`: the field will not contribute to the root (used for caches).
#[proc_macro_derive(TreeHash, attributes(tree_hash))]
pub fn tree_hash_derive(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as DeriveInput);
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = &item.generics.split_for_impl();

    let struct_data = match &item.data {
        syn::Data::Struct(s) => s,
        _ => panic!("tree_hash_derive only supports structs."),
    };

    let idents = get_hashable_fields(struct_data, "tree_hash");
    let num_leaves = idents.len();

    let output = quote! {
        impl #impl_generics tree_hash::TreeHash for #name #ty_generics #where_clause {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Container
            }

            fn tree_hash_packed_encoding(&self) -> Vec<u8> {
                unreachable!("Struct should never be packed.")
            }

            fn tree_hash_packing_factor() -> usize {
                unreachable!("Struct should never be packed.")
            }

            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                let mut hasher = tree_hash::MerkleHasher::with_leaves(#num_leaves);

                #(
                    hasher
                        .write(self.#idents.tree_hash_root().as_bytes())
                        .expect("tree hash derive should not apply too many leaves");
                )*

                hasher
                    .finish()
                    .expect("tree hash derive should not have a remaining buffer")
            }
        }
    };
    output.into()
}

/// Implements `tree_hash::SignedRoot` for some `struct`: the signing root is the merkleization of
/// the field roots with any `#[signed_root(skip_hashing)]` fields (conventionally the trailing
/// signature) elided.
#[proc_macro_derive(SignedRoot, attributes(signed_root))]
pub fn signed_root_derive(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as DeriveInput);
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = &item.generics.split_for_impl();

    let struct_data = match &item.data {
        syn::Data::Struct(s) => s,
        _ => panic!("tree_hash_derive only supports structs."),
    };

    let idents = get_hashable_fields(struct_data, "signed_root");
    let num_leaves = idents.len();

    let output = quote! {
        impl #impl_generics tree_hash::SignedRoot for #name #ty_generics #where_clause {
            fn signed_root(&self) -> tree_hash::Hash256 {
                let mut hasher = tree_hash::MerkleHasher::with_leaves(#num_leaves);

                #(
                    hasher
                        .write(tree_hash::TreeHash::tree_hash_root(&self.#idents).as_bytes())
                        .expect("signed root derive should not apply too many leaves");
                )*

                hasher
                    .finish()
                    .expect("signed root derive should not have a remaining buffer")
            }
        }
    };
    output.into()
}
