use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Type};

struct ColumnField {
    ident: Ident,
    column: String,
    skip: bool,
    ty: Type,
}

impl ColumnField {
    fn parse(field: &Field) -> Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(field.span(), "FromRow needs named fields"))?;

        let mut column = ident.to_string();
        let mut skip = false;

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("datamapper")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    let lit: LitStr = meta.value()?.parse()?;
                    column = lit.value();
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `column = \"...\"` or `skip`"))
                }
            })?;
        }

        if column.is_empty() {
            return Err(Error::new(field.span(), "column name must not be empty"));
        }

        Ok(Self {
            ident,
            column,
            skip,
            ty: field.ty.clone(),
        })
    }

    fn initializer(&self) -> TokenStream {
        let ident = &self.ident;
        let ty = &self.ty;
        let column = &self.column;
        if self.skip {
            quote! { #ident: <#ty as ::std::default::Default>::default() }
        } else {
            quote! { #ident: ::datamapper::RowExt::get::<#ty>(row, #column)? }
        }
    }
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => return Err(Error::new(input.span(), "FromRow needs named fields")),
        },
        _ => return Err(Error::new(input.span(), "FromRow can only be derived for structs")),
    };

    let fields = fields
        .iter()
        .map(ColumnField::parse)
        .collect::<Result<Vec<_>>>()?;

    let initializers = fields.iter().map(ColumnField::initializer);
    let columns = fields.iter().filter(|f| !f.skip).map(|f| f.column.as_str());

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::datamapper::FromRow for #name #ty_generics #where_clause {
            fn from_row<R: ::datamapper::Row>(row: &R) -> ::datamapper::Result<Self> {
                Ok(Self {
                    #(#initializers),*
                })
            }

            fn column_names() -> &'static [&'static str] {
                &[#(#columns),*]
            }
        }
    })
}
